//! Backend discovery and lifecycle.
//!
//! A manager turns a directory tree of manifest packages into a fixed
//! catalogue of named backends, then lazily instantiates and caches exactly
//! one instance per name. Discovery is a single-threaded construction-time
//! phase; afterwards the catalogue is immutable and only the instance cache
//! grows.

use crate::backends::registry::BackendRegistry;
use crate::backends::{Backend, manifest};
use crate::error::{RastroError, Result};
use crate::ui;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub struct BackendManager {
    path: PathBuf,
    strict: bool,
    registry: BackendRegistry,
    catalogue: Vec<String>,
    instances: Mutex<HashMap<String, Arc<dyn Backend>>>,
}

impl std::fmt::Debug for BackendManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendManager")
            .field("path", &self.path)
            .field("strict", &self.strict)
            .field("catalogue", &self.catalogue)
            .finish_non_exhaustive()
    }
}

impl BackendManager {
    /// Discover manifest packages under `path` into an otherwise empty
    /// catalogue. With `strict` set, the first unimportable package aborts
    /// construction with a [`RastroError::BackendImport`]; otherwise the
    /// failure is logged and the package contributes nothing.
    pub fn new(path: impl Into<PathBuf>, strict: bool) -> Result<Self> {
        Self::with_registry(BackendRegistry::new(), path, strict)
    }

    /// Same as [`new`](Self::new), layering discovery on top of a
    /// pre-populated registry (the compiled built-ins).
    pub fn with_registry(
        mut registry: BackendRegistry,
        path: impl Into<PathBuf>,
        strict: bool,
    ) -> Result<Self> {
        let path = path.into();

        if path.is_dir() {
            walk(&path, strict, &mut registry)?;
        }

        let catalogue = registry.names();

        Ok(BackendManager {
            path,
            strict,
            registry,
            catalogue,
            instances: Mutex::new(HashMap::new()),
        })
    }

    /// Root directory this manager scanned.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Discovered backend names, sorted; fixed for the manager's lifetime.
    pub fn backends(&self) -> &[String] {
        &self.catalogue
    }

    /// The named backend, instantiating it on first request and returning
    /// the same cached instance thereafter.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Backend>> {
        if !self.catalogue.iter().any(|n| n == name) {
            return Err(RastroError::BackendNotFound {
                name: name.to_string(),
            });
        }

        let mut instances = self
            .instances
            .lock()
            .map_err(|_| RastroError::Other("backend instance cache poisoned".to_string()))?;

        if let Some(instance) = instances.get(name) {
            return Ok(Arc::clone(instance));
        }

        let instance = self
            .registry
            .instantiate(name)
            .ok_or_else(|| RastroError::BackendNotFound {
                name: name.to_string(),
            })?;
        instances.insert(name.to_string(), Arc::clone(&instance));
        Ok(instance)
    }
}

/// Visit `dir` depth-first in sorted order so repeated runs against an
/// unchanged tree produce the same catalogue. Directories holding an entry
/// manifest are imported as packages and not descended into further; their
/// remaining files are private helpers.
fn walk(dir: &Path, strict: bool, registry: &mut BackendRegistry) -> Result<()> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            let error = RastroError::IoError {
                path: dir.to_path_buf(),
                source,
            };
            if strict {
                return Err(error);
            }
            ui::warning(&error.to_string());
            return Ok(());
        }
    };

    let mut subdirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();

    for subdir in subdirs {
        let entry_manifest = subdir.join(manifest::ENTRY_MANIFEST);
        if !entry_manifest.is_file() {
            walk(&subdir, strict, registry)?;
            continue;
        }

        if let Err(cause) = import_package(&subdir, &entry_manifest, registry) {
            let package = subdir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let error = RastroError::BackendImport {
                name: package,
                cause: Some(Box::new(cause)),
            };
            if strict {
                return Err(error);
            }
            ui::warning(&error.to_string());
        }
    }

    Ok(())
}

fn import_package(
    dir: &Path,
    entry_manifest: &Path,
    registry: &mut BackendRegistry,
) -> Result<()> {
    let content =
        std::fs::read_to_string(entry_manifest).map_err(|source| RastroError::IoError {
            path: entry_manifest.to_path_buf(),
            source,
        })?;

    for config in manifest::parse_entry_manifest(&content, dir)? {
        registry.register_config(config);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn package(root: &Path, name: &str, manifest: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).expect("create package dir");
        fs::write(dir.join(manifest::ENTRY_MANIFEST), manifest).expect("write manifest");
    }

    #[test]
    fn missing_root_yields_empty_catalogue() {
        let manager = BackendManager::new("/nonexistent/backends", false).expect("manager");
        assert!(manager.backends().is_empty());
    }

    #[test]
    fn discovery_order_is_deterministic() {
        let root = TempDir::new().expect("tempdir");
        package(root.path(), "zeta", "backend \"Z\" { format \"xml\" }");
        package(root.path(), "alpha", "backend \"A\" { format \"csv\" }");

        let manager = BackendManager::new(root.path(), true).expect("manager");
        assert_eq!(&["A".to_string(), "Z".to_string()], manager.backends());
    }

    #[test]
    fn package_subtrees_are_not_descended_into() {
        let root = TempDir::new().expect("tempdir");
        package(root.path(), "outer", "backend \"A\" { format \"csv\" }");
        // A nested manifest below an imported package is a private detail.
        package(
            &root.path().join("outer"),
            "inner",
            "backend \"B\" { format \"csv\" }",
        );

        let manager = BackendManager::new(root.path(), true).expect("manager");
        assert_eq!(&["A".to_string()], manager.backends());
    }
}
