//! Name-indexed store of backend constructors.
//!
//! The registry maps each backend name to a zero-argument factory. Built-in
//! backends are a compiled list registered by [`BackendRegistry::register_defaults`];
//! manifest packages add config-driven entries during discovery. Registration
//! is a startup-phase activity: a manager snapshots the registry at
//! construction and never refreshes it.

use crate::backends::config::TrackerConfig;
use crate::backends::generic::GenericBackend;
use crate::backends::taiga::TaigaBackend;
use crate::backends::{Backend, BackendFactory};
use std::collections::HashMap;
use std::sync::Arc;

pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a backend under a name. Re-registering a name overwrites the
    /// prior entry: last writer wins.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn Backend> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Register a config-driven backend under the config's own name.
    pub fn register_config(&mut self, config: TrackerConfig) {
        let name = config.name.clone();
        self.register(name, move || {
            Arc::new(GenericBackend::from_config(config.clone())) as Arc<dyn Backend>
        });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted for deterministic catalogues.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Construct a fresh instance of the named backend.
    pub fn instantiate(&self, name: &str) -> Option<Arc<dyn Backend>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Register all built-in backends.
    pub fn register_defaults(&mut self) {
        self.register("taiga", || Arc::new(TaigaBackend::new()) as Arc<dyn Backend>);
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register_defaults();
        registry
    }
}
