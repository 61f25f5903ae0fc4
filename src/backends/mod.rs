//! Tracker backends.
//!
//! A backend knows how to mirror one kind of issue tracker. Built-in
//! backends (currently [`taiga`]) ship with the binary; additional
//! trackers are declared in manifest packages discovered under the
//! backends directory and served by [`generic::GenericBackend`].
//!
//! The [`BackendRegistry`] maps backend names to factories, the
//! [`BackendManager`] layers package discovery and instance caching on
//! top of it.

pub mod config;
pub mod generic;
pub mod manager;
pub mod manifest;
pub mod registry;
pub mod taiga;

pub use self::config::{PayloadFormat, TrackerConfig};
pub use self::manager::BackendManager;
pub use self::registry::BackendRegistry;

use crate::error::Result;
use std::sync::Arc;

/// One mirrorable tracker kind.
pub trait Backend: Send + Sync {
    /// Name under which the backend is published in the catalogue.
    fn name(&self) -> &str;

    /// Mirrors the tracker: fetch, unmarshal, store.
    fn run(&self) -> Result<()>;
}

impl std::fmt::Debug for dyn Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend").field("name", &self.name()).finish()
    }
}

/// Builds a fresh backend instance. The manager caches what factories
/// return, one instance per name.
pub type BackendFactory = Box<dyn Fn() -> Arc<dyn Backend> + Send + Sync>;
