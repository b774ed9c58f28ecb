//! Host form object → plain props record.
//!
//! Only the boundary is modelled: the host exposes fields (name, label, widget metadata) and
//! per-field errors. Labels may be computed lazily by the host; they are forced to strings
//! here so nothing deferred crosses into the envelope.
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::descriptor::{Describe, TypeDescriptor};

pub const WIDGET_HINT: &str = "WidgetType";

// ————————————————————————————————————————————————————————————————————————————
// HOST SIDE
// ————————————————————————————————————————————————————————————————————————————

pub enum Label {
    Ready(String),
    Deferred(Box<dyn Fn() -> String + Send + Sync>),
}

impl Label {
    pub fn deferred(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self::Deferred(Box::new(f))
    }

    pub fn force(&self) -> String {
        match self {
            Self::Ready(s) => s.clone(),
            Self::Deferred(f) => f(),
        }
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self { Self::Ready(s.to_string()) }
}

impl From<String> for Label {
    fn from(s: String) -> Self { Self::Ready(s) }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(s) => f.debug_tuple("Ready").field(s).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

pub trait HostField {
    fn name(&self) -> &str;
    fn label(&self) -> Label;
    /// Widget metadata as the host's renderer describes it.
    fn widget(&self) -> Value;
}

pub trait HostForm {
    fn fields(&self) -> Vec<&dyn HostField>;
    fn errors(&self) -> IndexMap<String, Option<Vec<String>>>;
    fn is_valid(&self) -> bool;
}

// ————————————————————————————————————————————————————————————————————————————
// PROPS SIDE
// ————————————————————————————————————————————————————————————————————————————

/// Widget metadata. Sent as-is; the schema deliberately says nothing about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Widget(pub Value);

impl Describe for Widget {
    fn describe() -> TypeDescriptor { TypeDescriptor::opaque(WIDGET_HINT) }
}

crate::record! {
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct FieldType {
        pub name: String,
        pub label: String,
        pub widget: Widget,
    }
}

crate::record! {
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct FormType {
        pub errors: IndexMap<String, Option<Vec<String>>>,
        pub fields: Vec<FieldType>,
    }
}

pub fn serialize_form(form: Option<&dyn HostForm>) -> Option<FormType> {
    let form = form?;
    let errors = if form.is_valid() { IndexMap::new() } else { form.errors() };
    let fields = form
        .fields()
        .into_iter()
        .map(|field| FieldType {
            name: field.name().to_string(),
            label: field.label().force(),
            widget: Widget(field.widget()),
        })
        .collect::<Vec<_>>();
    tracing::debug!(fields = fields.len(), errors = errors.len(), "serialized form");
    Some(FormType { errors, fields })
}

// ------------------------------- Tests ------------------------------------ //
