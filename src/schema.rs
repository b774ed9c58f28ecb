//! Descriptor → JSON-Schema-ish document.
//!
//! Pure and deterministic: maps are insertion ordered (`preserve_order`), so the same
//! descriptor always serializes to the same bytes.
//!
//! Known gap: `OpaqueHint` fields are *absent*. They are dropped from `properties` and
//! `required`, so the payload carries them but the schema never constrains them.
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::descriptor::{Primitive, RecordDescriptor, TypeDescriptor};

/// Schema fragment for one descriptor; `None` means "absent".
pub fn generate(ty: &TypeDescriptor) -> Option<Value> {
    match ty {
        TypeDescriptor::Primitive(p) => Some(primitive(*p)),
        TypeDescriptor::Union(alts) => {
            let arms: Vec<Value> = alts.iter().filter_map(generate).collect();
            if arms.is_empty() && !alts.is_empty() {
                return None;
            }
            Some(json!({ "anyOf": arms }))
        }
        TypeDescriptor::Sequence(elem) => {
            let mut o = json!({ "type": "array" });
            if let Some(items) = generate(elem) {
                o["items"] = items;
            }
            Some(o)
        }
        TypeDescriptor::Mapping(val) => {
            let mut o = json!({ "type": "object" });
            if let Some(values) = generate(val) {
                o["additionalProperties"] = values;
            }
            Some(o)
        }
        TypeDescriptor::Record(rec) => Some(generate_record(rec)),
        TypeDescriptor::OpaqueHint(_) => None,
        TypeDescriptor::Any => Some(Value::Object(Map::new())),
    }
}

/// A record is never absent, so this one is total.
pub fn generate_record(rec: &RecordDescriptor) -> Value {
    let mut properties = Map::new();
    let mut required: Vec<Value> = Vec::with_capacity(rec.fields.len());
    for field in &rec.fields {
        if let Some(schema) = generate(&field.ty) {
            properties.insert(field.name.clone(), schema);
            required.push(Value::from(field.name.clone()));
        }
    }
    json!({
        "title": rec.name,
        "type": "object",
        "additionalProperties": false,
        "properties": properties,
        "required": required,
    })
}

fn primitive(p: Primitive) -> Value {
    let token = match p {
        Primitive::String => "string",
        Primitive::Number => "number",
        // not "boolean": the client's schema reader expects this token
        Primitive::Boolean => "bool",
        Primitive::Null => "null",
    };
    json!({ "type": token })
}

/// Pretty JSON with 4-space indentation (the export format).
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, fmt);
    value.serialize(&mut ser)?;
    // serde_json only ever writes UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn primitives_are_exact_fragments() {
        assert_eq!(generate(&TypeDescriptor::string()), Some(json!({"type": "string"})));
        assert_eq!(generate(&TypeDescriptor::number()), Some(json!({"type": "number"})));
        assert_eq!(generate(&TypeDescriptor::boolean()), Some(json!({"type": "bool"})));
        assert_eq!(generate(&TypeDescriptor::null()), Some(json!({"type": "null"})));
    }

    #[test]
    fn containers_and_unions() {
        let ty = TypeDescriptor::mapping(TypeDescriptor::optional(TypeDescriptor::sequence(
            TypeDescriptor::string(),
        )));
        assert_eq!(
            generate(&ty),
            Some(json!({
                "type": "object",
                "additionalProperties": {
                    "anyOf": [
                        {"type": "array", "items": {"type": "string"}},
                        {"type": "null"},
                    ]
                }
            })),
        );
        assert_eq!(generate(&TypeDescriptor::Any), Some(json!({})));
    }

    #[test]
    fn record_required_follows_field_order() {
        let rec = RecordDescriptor::new("Ordered")
            .field("zeta", TypeDescriptor::string())
            .field("alpha", TypeDescriptor::boolean())
            .field("mid", TypeDescriptor::Any);
        let schema = generate_record(&rec);
        assert_eq!(schema["required"], json!(["zeta", "alpha", "mid"]));
        let keys: Vec<&String> = schema["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        assert_eq!(schema["title"], "Ordered");
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn opaque_fields_are_dropped_from_properties_and_required() {
        let field = RecordDescriptor::new("FieldType")
            .field("name", TypeDescriptor::string())
            .field("widget", TypeDescriptor::opaque("WidgetType"))
            .field("label", TypeDescriptor::string());
        let schema = generate_record(&field);
        assert_eq!(
            schema,
            json!({
                "title": "FieldType",
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "name": {"type": "string"},
                    "label": {"type": "string"},
                },
                "required": ["name", "label"],
            }),
        );
        assert_eq!(generate(&TypeDescriptor::opaque("WidgetType")), None);
    }

    #[test]
    fn absent_inside_containers() {
        let hint = || TypeDescriptor::opaque("Hint");
        assert_eq!(generate(&TypeDescriptor::sequence(hint())), Some(json!({"type": "array"})));
        assert_eq!(generate(&TypeDescriptor::mapping(hint())), Some(json!({"type": "object"})));
        assert_eq!(
            generate(&TypeDescriptor::optional(hint())),
            Some(json!({"anyOf": [{"type": "null"}]})),
        );
        assert_eq!(generate(&TypeDescriptor::union([hint(), hint()])), None);
    }

    #[test]
    fn output_is_byte_stable() {
        let rec = RecordDescriptor::new("Stable")
            .field("b", TypeDescriptor::number())
            .field("a", TypeDescriptor::sequence(TypeDescriptor::boolean()));
        let one = serde_json::to_string(&generate_record(&rec)).unwrap();
        let two = serde_json::to_string(&generate_record(&rec.clone())).unwrap();
        assert_eq!(one, two);
        assert!(one.starts_with(r#"{"title":"Stable","type":"object","additionalProperties":false,"properties":{"b""#));
    }

    #[test]
    fn pretty_output_uses_four_spaces() {
        let src = to_pretty_json(&json!({"a": [1]})).unwrap();
        assert_eq!(src, "{\n    \"a\": [\n        1\n    ]\n}");
    }
}
