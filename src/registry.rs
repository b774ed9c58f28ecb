//! Name → props record, filled while views are declared and read when the schema is exported.
//!
//! Lifecycle: register (declaration phase) → `freeze` → `export`. Registering after the
//! freeze is an error. The process-wide instance sits behind one lock, so registration and
//! export never interleave even if views are declared late.
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};

use crate::descriptor::RecordDescriptor;
use crate::envelope::wrap_globals;
use crate::error::RegistryError;
use crate::schema::{generate_record, to_pretty_json};

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: IndexMap<String, RecordDescriptor>,   // first-registration order
    frozen: bool,
}

impl TypeRegistry {
    pub fn new() -> Self { Self::default() }

    /// Identical re-registration is a no-op; a different record under a taken name is
    /// rejected rather than silently overwriting the first one.
    pub fn register(&mut self, name: &str, descriptor: RecordDescriptor) -> Result<(), RegistryError> {
        if self.frozen {
            return Err(RegistryError::Frozen { name: name.to_string() });
        }
        descriptor.validate().map_err(|source| RegistryError::InvalidDescriptor {
            name: name.to_string(),
            source,
        })?;
        if let Some(existing) = self.entries.get(name) {
            if *existing == descriptor {
                tracing::debug!(name, "props type already registered");
                return Ok(());
            }
            return Err(RegistryError::NameCollision {
                name: name.to_string(),
                existing: existing.name.clone(),
                incoming: descriptor.name,
            });
        }
        tracing::debug!(name, record = %descriptor.name, fields = descriptor.fields.len(), "registered props type");
        self.entries.insert(name.to_string(), descriptor);
        Ok(())
    }

    pub fn freeze(&mut self) {
        if !self.frozen {
            tracing::info!(types = self.entries.len(), "type registry frozen");
        }
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool { self.frozen }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, name: &str) -> Option<&RecordDescriptor> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The aggregate schema: one globals-wrapped record schema per registered name.
    pub fn export(&self) -> Value {
        let properties: Map<String, Value> = self
            .entries
            .iter()
            .map(|(name, rec)| (name.clone(), wrap_globals(generate_record(rec))))
            .collect();
        let required: Vec<Value> = self.entries.keys().cloned().map(Value::from).collect();
        tracing::info!(types = self.entries.len(), "exported schema");
        json!({
            "title": "Schema",
            "type": "object",
            "additionalProperties": false,
            "properties": properties,
            "required": required,
        })
    }

    pub fn export_pretty(&self) -> serde_json::Result<String> {
        to_pretty_json(&self.export())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PROCESS-WIDE INSTANCE
// ————————————————————————————————————————————————————————————————————————————

static REGISTRY: Lazy<RwLock<TypeRegistry>> = Lazy::new(|| RwLock::new(TypeRegistry::new()));

pub fn global() -> &'static RwLock<TypeRegistry> {
    &REGISTRY
}

pub fn register(name: &str, descriptor: RecordDescriptor) -> Result<(), RegistryError> {
    REGISTRY.write().register(name, descriptor)
}

pub fn freeze() {
    REGISTRY.write().freeze();
}

pub fn export() -> Value {
    REGISTRY.read().export()
}

pub fn export_pretty() -> serde_json::Result<String> {
    REGISTRY.read().export_pretty()
}

// ------------------------------- Tests ------------------------------------ //
