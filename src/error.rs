//! Error taxonomy.
//!
//! Declaration-time errors (`DescriptorError`, `RegistryError`) are meant to abort startup.
//! Request-time errors (`ParamsError`, `ViewError`) go back to the host unchanged.
use thiserror::Error;

// ————————————————————————————————————————————————————————————————————————————
// DECLARATION TIME
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("record type has an empty name")]
    EmptyRecordName,
    #[error("record `{record}` has a field with an empty name")]
    EmptyFieldName { record: String },
    #[error("record `{record}` declares field `{field}` more than once")]
    DuplicateField { record: String, field: String },
    #[error("record `{record}` has an opaque hint with an empty name")]
    EmptyHintName { record: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("type registry is frozen; `{name}` was registered after the declaration phase")]
    Frozen { name: String },
    #[error("`{name}` is already registered with a different props type (`{existing}` vs `{incoming}`)")]
    NameCollision {
        name: String,
        existing: String,
        incoming: String,
    },
    #[error("invalid props type for `{name}`: {source}")]
    InvalidDescriptor {
        name: String,
        #[source]
        source: DescriptorError,
    },
}

// ————————————————————————————————————————————————————————————————————————————
// REQUEST TIME
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("props must serialize to a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },
    #[error("failed to serialize props: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The declared parameter record rejected the request's keyword inputs.
#[derive(Debug, Error)]
#[error("invalid view parameters at JSON path {path} → {source}")]
pub struct ParamsError {
    pub path: String,
    #[source]
    pub source: serde_json::Error,
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Params(#[from] ParamsError),
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
    /// Whatever the view itself returned; never wrapped or rewritten.
    #[error(transparent)]
    View(anyhow::Error),
}
