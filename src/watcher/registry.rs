//! WatcherRegistry - map persisted type tags back to watcher factories.

use crate::client::RemoteClient;
use crate::error::{Result, WatchError};
use crate::watcher::{
    CommandResultWatcher, OperationPollWatcher, SuspendableWatcher, WatcherDescriptor,
    COMMAND_RESULT_TYPE_TAG, OPERATION_POLL_TYPE_TAG,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Type alias for boxed watcher factory functions.
pub type WatcherFactory =
    Box<dyn Fn(&WatcherDescriptor) -> Result<Box<dyn SuspendableWatcher>> + Send + Sync>;

/// Registry resolving a descriptor's type tag to a factory that reconstructs
/// the watcher.
///
/// The host registers factories at startup and resolves persisted
/// descriptors through the registry when resuming after a restart.
#[derive(Default)]
pub struct WatcherRegistry {
    factories: RwLock<HashMap<String, Arc<WatcherFactory>>>,
}

impl WatcherRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// Registry with both built-in watchers bound to a shared remote client.
    pub fn with_builtin_watchers(client: Arc<dyn RemoteClient>) -> Self {
        let mut factories: HashMap<String, Arc<WatcherFactory>> = HashMap::new();

        let poll_client = Arc::clone(&client);
        factories.insert(
            OPERATION_POLL_TYPE_TAG.to_string(),
            Arc::new(Box::new(move |descriptor| {
                let watcher =
                    OperationPollWatcher::from_descriptor(descriptor, Arc::clone(&poll_client))?;
                Ok(Box::new(watcher) as Box<dyn SuspendableWatcher>)
            })),
        );

        factories.insert(
            COMMAND_RESULT_TYPE_TAG.to_string(),
            Arc::new(Box::new(move |descriptor| {
                let watcher =
                    CommandResultWatcher::from_descriptor(descriptor, Arc::clone(&client))?;
                Ok(Box::new(watcher) as Box<dyn SuspendableWatcher>)
            })),
        );

        Self {
            factories: RwLock::new(factories),
        }
    }

    /// Register a factory for a type tag. Each tag must be unique within a
    /// registry.
    pub fn register<F>(&self, type_tag: &str, factory: F) -> Result<()>
    where
        F: Fn(&WatcherDescriptor) -> Result<Box<dyn SuspendableWatcher>> + Send + Sync + 'static,
    {
        let mut factories = self.factories.write();
        if factories.contains_key(type_tag) {
            return Err(WatchError::AlreadyRegistered(type_tag.to_string()));
        }
        factories.insert(type_tag.to_string(), Arc::new(Box::new(factory)));
        Ok(())
    }

    /// Reconstruct a watcher from a persisted descriptor.
    pub fn resolve(&self, descriptor: &WatcherDescriptor) -> Result<Box<dyn SuspendableWatcher>> {
        let factory = self
            .factories
            .read()
            .get(&descriptor.type_tag)
            .cloned()
            .ok_or_else(|| WatchError::UnknownWatcherType(descriptor.type_tag.clone()))?;
        (*factory)(descriptor)
    }

    /// Check if a type tag is registered.
    pub fn has(&self, type_tag: &str) -> bool {
        self.factories.read().contains_key(type_tag)
    }

    /// Get all registered type tags.
    pub fn registered_tags(&self) -> Vec<String> {
        self.factories.read().keys().cloned().collect()
    }

    /// Get the number of registered watcher types.
    pub fn len(&self) -> usize {
        self.factories.read().len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.read().is_empty()
    }
}

impl std::fmt::Debug for WatcherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherRegistry")
            .field("factories", &self.registered_tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRemoteClient;
    use crate::watcher::encode_params;
    use serde_json::json;

    fn poll_descriptor() -> WatcherDescriptor {
        WatcherDescriptor::new(
            OPERATION_POLL_TYPE_TAG,
            encode_params(&json!({
                "project_id": "my-project",
                "region": "us-central1",
                "operation_name": "operations/env-create-123",
            }))
            .unwrap(),
        )
    }

    #[test]
    fn test_builtin_registry_resolves_both_watchers() {
        let registry = WatcherRegistry::with_builtin_watchers(Arc::new(MockRemoteClient::new()));
        assert_eq!(registry.len(), 2);
        assert!(registry.has(OPERATION_POLL_TYPE_TAG));
        assert!(registry.has(COMMAND_RESULT_TYPE_TAG));

        let watcher = registry.resolve(&poll_descriptor()).unwrap();
        assert_eq!(watcher.type_tag(), OPERATION_POLL_TYPE_TAG);
    }

    #[test]
    fn test_unknown_tag_is_an_error() {
        let registry = WatcherRegistry::new();
        assert!(registry.is_empty());

        let err = registry.resolve(&poll_descriptor()).err().unwrap();
        assert!(
            matches!(err, WatchError::UnknownWatcherType(tag) if tag == OPERATION_POLL_TYPE_TAG)
        );
    }

    #[test]
    fn test_duplicate_registration_is_an_error() {
        let registry = WatcherRegistry::with_builtin_watchers(Arc::new(MockRemoteClient::new()));
        let err = registry
            .register(OPERATION_POLL_TYPE_TAG, |descriptor| {
                Err(WatchError::UnknownWatcherType(descriptor.type_tag.clone()))
            })
            .unwrap_err();
        assert!(matches!(err, WatchError::AlreadyRegistered(_)));
    }

    #[test]
    fn test_resolved_watcher_serializes_back_to_its_descriptor() {
        let registry = WatcherRegistry::with_builtin_watchers(Arc::new(MockRemoteClient::new()));
        let descriptor = poll_descriptor();
        let watcher = registry.resolve(&descriptor).unwrap();

        // Defaults are materialized on the way through, so decode both sides.
        let reserialized = watcher.serialize().unwrap();
        assert_eq!(reserialized.type_tag, descriptor.type_tag);
        assert_eq!(
            reserialized.params.get("operation_name"),
            descriptor.params.get("operation_name")
        );
    }
}
