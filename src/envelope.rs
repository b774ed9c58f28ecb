//! Per-response wire document: props merged with the injected global fields.
//!
//! Precedence: props are spread first, globals are written after, so a props field named
//! `template_name`, `csrf_token` or `messages` is overwritten. `wrap_globals` applies the
//! same rule to the schema.
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::error::EnvelopeError;
use crate::message::Message;

pub const TEMPLATE_NAME: &str = "template_name";
pub const CSRF_TOKEN: &str = "csrf_token";
pub const MESSAGES: &str = "messages";

pub const RESERVED_FIELDS: [&str; 3] = [TEMPLATE_NAME, CSRF_TOKEN, MESSAGES];

// ————————————————————————————————————————————————————————————————————————————
// RUNTIME
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub props: Map<String, Value>,
    pub template_name: String,
    pub csrf_token: String,
    pub messages: Vec<Message>,
}

impl Envelope {
    pub fn build<P: Serialize + ?Sized>(
        props: &P,
        template_name: impl Into<String>,
        csrf_token: impl Into<String>,
        messages: Vec<Message>,
    ) -> Result<Self, EnvelopeError> {
        let props = match serde_json::to_value(props)? {
            Value::Object(map) => map,
            other => return Err(EnvelopeError::NotAnObject { kind: kind_of(&other) }),
        };
        let envelope = Self {
            props,
            template_name: template_name.into(),
            csrf_token: csrf_token.into(),
            messages,
        };
        for key in RESERVED_FIELDS {
            if envelope.props.contains_key(key) {
                tracing::warn!(
                    template = %envelope.template_name,
                    field = key,
                    "props field shadowed by injected global"
                );
            }
        }
        tracing::debug!(
            template = %envelope.template_name,
            fields = envelope.props.len(),
            messages = envelope.messages.len(),
            "built envelope"
        );
        Ok(envelope)
    }

    /// The flat wire object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.merged())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    fn merged(&self) -> Map<String, Value> {
        let mut out = self.props.clone();
        out.insert(TEMPLATE_NAME.to_string(), Value::from(self.template_name.clone()));
        out.insert(CSRF_TOKEN.to_string(), Value::from(self.csrf_token.clone()));
        out.insert(
            MESSAGES.to_string(),
            Value::Array(self.messages.iter().map(message_value).collect()),
        );
        out
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.merged().serialize(serializer)
    }
}

fn message_value(m: &Message) -> Value {
    json!({ "level": m.level, "level_tag": m.level_tag, "message": m.message })
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SCHEMA
// ————————————————————————————————————————————————————————————————————————————

/// Fixed schema of the `messages` global.
pub fn messages_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "level": { "type": "number" },
                "level_tag": { "type": "string" },
                "message": { "type": "string" },
            },
            "required": ["level", "level_tag", "message"],
            "additionalProperties": false,
        },
    })
}

/// Add the three globals to a record schema's `properties` and `required`.
///
/// Injected sub-schemas replace same-named ones; `required` never lists a name twice.
pub fn wrap_globals(mut schema: Value) -> Value {
    let Some(obj) = schema.as_object_mut() else {
        return schema;
    };

    let properties = obj
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(properties) = properties.as_object_mut() {
        properties.insert(TEMPLATE_NAME.to_string(), json!({ "type": "string" }));
        properties.insert(CSRF_TOKEN.to_string(), json!({ "type": "string" }));
        properties.insert(MESSAGES.to_string(), messages_schema());
    }

    let required = obj
        .entry("required")
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Some(required) = required.as_array_mut() {
        required.retain(|name| !RESERVED_FIELDS.iter().any(|r| name.as_str() == Some(*r)));
        required.extend(RESERVED_FIELDS.iter().map(|r| Value::from(*r)));
    }

    schema
}

// ------------------------------- Tests ------------------------------------ //
