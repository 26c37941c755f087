//! Startup-built registry of entity capabilities.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::core::Entity;
use crate::error::SchemaError;
use crate::types::{Post, Source, User};

use super::capabilities::EntityCapabilities;

/// Capability sets keyed by entity name.
///
/// Built once at startup and shared read-only afterwards. Lookups for an
/// entity that was never registered yield empty capabilities.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    entries: HashMap<&'static str, Arc<EntityCapabilities>>,
    empty: Arc<EntityCapabilities>,
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every feed entity registered.
    pub fn feed() -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        registry.register::<User>()?;
        registry.register::<Source>()?;
        registry.register::<Post>()?;
        Ok(registry)
    }

    /// Validates and registers the declared capabilities of `E`.
    pub fn register<E: Entity>(&mut self) -> Result<(), SchemaError> {
        let schema = E::schema();
        let caps = EntityCapabilities::declare(
            schema,
            E::filterable_fields(),
            E::sortable_fields(),
            E::searchable_fields(),
        )?;
        debug!(
            entity = schema.name,
            filterable = caps.filterable().len(),
            sortable = caps.sortable().len(),
            searchable = caps.searchable().len(),
            "Registered entity capabilities"
        );
        self.entries.insert(schema.name, Arc::new(caps));
        Ok(())
    }

    /// Returns the capabilities registered under `entity`.
    pub fn get(&self, entity: &str) -> Arc<EntityCapabilities> {
        self.entries
            .get(entity)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.empty))
    }

    /// Returns the capabilities of `E`.
    pub fn of<E: Entity>(&self) -> Arc<EntityCapabilities> {
        self.get(E::schema().name)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
