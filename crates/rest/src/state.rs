//! Application state shared by all request handlers.

use std::sync::Arc;

use feedkeeper_persistence::core::FeedStorage;
use feedkeeper_persistence::schema::CapabilityRegistry;

use crate::config::ServerConfig;

/// Shared application state for the API.
///
/// Holds the storage backend, the server configuration and the capability
/// registry built at startup. The registry is read-only afterwards.
///
/// # Type Parameters
///
/// * `S` - The storage backend type (must implement [`FeedStorage`])
pub struct AppState<S> {
    /// The storage backend.
    storage: Arc<S>,

    /// Server configuration.
    config: Arc<ServerConfig>,

    /// Per-entity list capabilities.
    registry: Arc<CapabilityRegistry>,
}

// Manually implement Clone since S is wrapped in Arc and doesn't need to be Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: Arc::clone(&self.config),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<S: FeedStorage> AppState<S> {
    /// Creates a new AppState.
    pub fn new(storage: Arc<S>, config: ServerConfig, registry: CapabilityRegistry) -> Self {
        Self {
            storage,
            config: Arc::new(config),
            registry: Arc::new(registry),
        }
    }

    /// Returns a reference to the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the capability registry.
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Returns the default page size for list results.
    pub fn default_page_size(&self) -> u64 {
        self.config.default_page_size
    }

    /// Returns the maximum page size for list results.
    pub fn max_page_size(&self) -> u64 {
        self.config.max_page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedkeeper_persistence::backends::memory::MemoryBackend;
    use feedkeeper_persistence::types::Source;

    fn state(config: ServerConfig) -> AppState<MemoryBackend> {
        AppState::new(
            Arc::new(MemoryBackend::new()),
            config,
            CapabilityRegistry::feed().unwrap(),
        )
    }

    #[test]
    fn test_app_state_creation() {
        let state = state(ServerConfig::default());
        assert_eq!(state.storage().backend_name(), "memory");
        assert!(state.registry().of::<Source>().allows_sort("name"));
    }

    #[test]
    fn test_app_state_config_access() {
        let state = state(ServerConfig {
            default_page_size: 50,
            max_page_size: 500,
            ..Default::default()
        });
        assert_eq!(state.default_page_size(), 50);
        assert_eq!(state.max_page_size(), 500);
    }

    #[test]
    fn test_app_state_clone() {
        let state = state(ServerConfig::default());
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.registry, &cloned.registry));
    }
}
