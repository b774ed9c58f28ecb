//! Type-level shape of declared props. No runtime values here.
//!
//! Rust has no field reflection, so shapes come from one of two places:
//! - `record!`, which declares a struct and derives its `RecordType` from the field list
//! - a hand-written `RecordDescriptor::new(..).field(..)` chain
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use indexmap::IndexMap;

use crate::error::DescriptorError;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Primitive(Primitive),
    Union(Vec<TypeDescriptor>),     // order kept for stable output only
    Sequence(Box<TypeDescriptor>),
    Mapping(Box<TypeDescriptor>),   // keys are always strings
    Record(RecordDescriptor),
    /// Named client-side type whose structure is never reflected into schema.
    OpaqueHint(String),
    /// No constraint at all; unlike `OpaqueHint` the field is still emitted.
    Any,
}

/// A named, closed object shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDescriptor {
    pub name: String,
    pub fields: Vec<Field>,         // declaration order == `required` order
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeDescriptor,
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTION
// ————————————————————————————————————————————————————————————————————————————

impl TypeDescriptor {
    pub fn string() -> Self { Self::Primitive(Primitive::String) }
    pub fn number() -> Self { Self::Primitive(Primitive::Number) }
    pub fn boolean() -> Self { Self::Primitive(Primitive::Boolean) }
    pub fn null() -> Self { Self::Primitive(Primitive::Null) }

    pub fn union(alternatives: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        Self::Union(alternatives.into_iter().collect())
    }
    pub fn sequence(element: TypeDescriptor) -> Self {
        Self::Sequence(Box::new(element))
    }
    pub fn mapping(value: TypeDescriptor) -> Self {
        Self::Mapping(Box::new(value))
    }
    pub fn opaque(name: impl Into<String>) -> Self {
        Self::OpaqueHint(name.into())
    }
    /// `T | null`
    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Union(vec![inner, Self::null()])
    }
}

impl RecordDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fields: Vec::new() }
    }

    pub fn field(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.fields.push(Field { name: name.into(), ty });
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.ty)
    }

    /// Declaration-time checks. Nested records are checked too.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.name.is_empty() {
            return Err(DescriptorError::EmptyRecordName);
        }
        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(DescriptorError::EmptyFieldName { record: self.name.clone() });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(DescriptorError::DuplicateField {
                    record: self.name.clone(),
                    field: field.name.clone(),
                });
            }
            validate_nested(&self.name, &field.ty)?;
        }
        Ok(())
    }
}

fn validate_nested(record: &str, ty: &TypeDescriptor) -> Result<(), DescriptorError> {
    match ty {
        TypeDescriptor::Primitive(_) | TypeDescriptor::Any => Ok(()),
        TypeDescriptor::Union(alts) => alts.iter().try_for_each(|a| validate_nested(record, a)),
        TypeDescriptor::Sequence(inner) | TypeDescriptor::Mapping(inner) => validate_nested(record, inner),
        TypeDescriptor::Record(rec) => rec.validate(),
        TypeDescriptor::OpaqueHint(name) if name.is_empty() => {
            Err(DescriptorError::EmptyHintName { record: record.to_string() })
        }
        TypeDescriptor::OpaqueHint(_) => Ok(()),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DERIVATION
// ————————————————————————————————————————————————————————————————————————————

/// Anything that can appear as a field type in a props record.
pub trait Describe {
    fn describe() -> TypeDescriptor;
}

/// Root props and parameter types: always a record.
pub trait RecordType {
    fn record_descriptor() -> RecordDescriptor;
}

/// Declare a struct and derive its `RecordType`/`Describe` from the field list.
///
/// ```
/// use serde::Serialize;
///
/// ssr_props::record! {
///     #[derive(Debug, Serialize)]
///     pub struct Greeting {
///         pub greeting: String,
///         pub tags: Vec<String>,
///     }
/// }
///
/// use ssr_props::descriptor::RecordType;
/// assert_eq!(Greeting::record_descriptor().fields.len(), 2);
/// ```
///
/// Field names and types are taken verbatim, and every field is required. `#[serde(...)]`
/// attributes (`rename`, `rename_all`, `skip_serializing_if`, `flatten`, `default`, ...) would
/// make the payload disagree with that closed schema, so they are a compile error here:
///
/// ```compile_fail
/// use serde::Serialize;
///
/// ssr_props::record! {
///     #[derive(Serialize)]
///     pub struct Sparse {
///         #[serde(skip_serializing_if = "Option::is_none")]
///         pub note: Option<String>,
///     }
/// }
/// ```
///
/// Types that need serde customization implement `RecordType` by hand.
#[macro_export]
macro_rules! record {
    (
        $(#[$($meta:tt)*])*
        $vis:vis struct $name:ident {
            $(
                $(#[$($field_meta:tt)*])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $( $crate::__record_attr!($($meta)*); )*
        $($( $crate::__record_attr!($($field_meta)*); )*)*

        $(#[$($meta)*])*
        $vis struct $name {
            $(
                $(#[$($field_meta)*])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::descriptor::RecordType for $name {
            fn record_descriptor() -> $crate::descriptor::RecordDescriptor {
                $crate::descriptor::RecordDescriptor::new(stringify!($name))
                    $(.field(
                        stringify!($field),
                        <$ty as $crate::descriptor::Describe>::describe(),
                    ))*
            }
        }

        impl $crate::descriptor::Describe for $name {
            fn describe() -> $crate::descriptor::TypeDescriptor {
                $crate::descriptor::TypeDescriptor::Record(
                    <Self as $crate::descriptor::RecordType>::record_descriptor(),
                )
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_attr {
    (serde $($rest:tt)*) => {
        compile_error!(
            "#[serde(...)] is not allowed inside `record!`: the descriptor would no longer match the payload"
        );
    };
    ($($other:tt)*) => {};
}

macro_rules! describe_as {
    ($ctor:ident: $($t:ty),* $(,)?) => {
        $(impl Describe for $t {
            fn describe() -> TypeDescriptor { TypeDescriptor::$ctor() }
        })*
    };
}

describe_as!(string: String, str, char);
describe_as!(number: i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);
describe_as!(boolean: bool);
describe_as!(null: ());

impl Describe for serde_json::Value {
    fn describe() -> TypeDescriptor { TypeDescriptor::Any }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn describe() -> TypeDescriptor { T::describe() }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor { TypeDescriptor::optional(T::describe()) }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor { TypeDescriptor::sequence(T::describe()) }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn describe() -> TypeDescriptor { TypeDescriptor::sequence(T::describe()) }
}

impl<T: Describe> Describe for [T] {
    fn describe() -> TypeDescriptor { TypeDescriptor::sequence(T::describe()) }
}

impl<V: Describe, S> Describe for HashMap<String, V, S> {
    fn describe() -> TypeDescriptor { TypeDescriptor::mapping(V::describe()) }
}

impl<V: Describe> Describe for BTreeMap<String, V> {
    fn describe() -> TypeDescriptor { TypeDescriptor::mapping(V::describe()) }
}

impl<V: Describe, S> Describe for IndexMap<String, V, S> {
    fn describe() -> TypeDescriptor { TypeDescriptor::mapping(V::describe()) }
}

// ------------------------------- Tests ------------------------------------ //
