// SPDX-FileCopyrightText: 2026 Steer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider registry keyed by provider name.
//!
//! Models refer to providers by the `provider` string in their config
//! (`"zai"`, `"openrouter"`, ...). The registry resolves that key to an
//! adapter at call time.

use std::collections::HashMap;
use std::sync::Arc;

use steer_core::{ProviderAdapter, SteerError};
use tracing::debug;

/// Registered provider adapters, assembled before the engine is built.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ProviderAdapter>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under `key`, replacing any previous entry.
    pub fn register(&mut self, key: impl Into<String>, provider: Arc<dyn ProviderAdapter>) {
        let key = key.into();
        debug!(
            key = key.as_str(),
            adapter = provider.name(),
            version = %provider.version(),
            "provider registered"
        );
        self.providers.insert(key, provider);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, key: impl Into<String>, provider: Arc<dyn ProviderAdapter>) -> Self {
        self.register(key, provider);
        self
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn ProviderAdapter>> {
        self.providers.get(key).cloned()
    }

    /// Like [`get`](Self::get), but a missing key is an error.
    pub fn require(&self, key: &str) -> Result<Arc<dyn ProviderAdapter>, SteerError> {
        self.get(key).ok_or_else(|| SteerError::ProviderNotFound {
            name: key.to_string(),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.providers.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steer_test_utils::MockProvider;

    #[test]
    fn register_and_lookup() {
        let registry = ProviderRegistry::new()
            .with("zai", Arc::new(MockProvider::new("zai")))
            .with("openrouter", Arc::new(MockProvider::new("openrouter")));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("zai"));
        assert_eq!(registry.get("openrouter").unwrap().name(), "openrouter");
        assert_eq!(registry.names(), vec!["openrouter", "zai"]);
    }

    #[test]
    fn missing_provider_is_not_found() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        let err = registry.require("zai").err().unwrap();
        assert!(matches!(err, SteerError::ProviderNotFound { ref name } if name == "zai"));
    }

    #[test]
    fn re_registering_replaces() {
        let mut registry = ProviderRegistry::new();
        registry.register("zai", Arc::new(MockProvider::new("first")));
        registry.register("zai", Arc::new(MockProvider::new("second")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("zai").unwrap().name(), "second");
    }
}
