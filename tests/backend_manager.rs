//! Backend discovery and lifecycle, exercised against real directory trees.

use rastro::backends::{BackendManager, BackendRegistry};
use rastro::error::RastroError;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn package(root: &Path, name: &str, manifest: &str) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).expect("create package dir");
    fs::write(dir.join("backend.kdl"), manifest).expect("write manifest");
}

#[test]
fn empty_directory_yields_empty_catalogue() {
    let root = TempDir::new().expect("tempdir");
    let manager = BackendManager::new(root.path(), true).expect("manager");
    assert!(manager.backends().is_empty());
}

#[test]
fn directories_without_entry_manifests_are_not_packages() {
    let root = TempDir::new().expect("tempdir");
    fs::create_dir_all(root.path().join("notes")).expect("create dir");
    fs::create_dir_all(root.path().join("drafts/deep")).expect("create dir");
    fs::write(root.path().join("drafts/stray.kdl"), "backend \"X\" { }").expect("write file");

    let manager = BackendManager::new(root.path(), true).expect("manager");
    assert!(manager.backends().is_empty());
}

#[test]
fn empty_entry_manifest_publishes_nothing() {
    let root = TempDir::new().expect("tempdir");
    package(root.path(), "hollow", "");

    let manager = BackendManager::new(root.path(), true).expect("manager");
    assert!(manager.backends().is_empty());
}

#[test]
fn broken_package_aborts_discovery_in_strict_mode() {
    let root = TempDir::new().expect("tempdir");
    package(root.path(), "broken", "backend \"oops {{{");

    let err = BackendManager::new(root.path(), true).unwrap_err();
    assert!(matches!(err, RastroError::BackendImport { .. }));
    assert!(err.to_string().starts_with("error importing backend broken."));
}

#[test]
fn broken_package_is_skipped_when_permissive() {
    let root = TempDir::new().expect("tempdir");
    package(root.path(), "broken", "backend \"oops {{{");
    package(root.path(), "fine", "backend \"A\" { format \"csv\" }");

    let manager = BackendManager::new(root.path(), false).expect("manager");
    assert_eq!(&["A".to_string()], manager.backends());
}

#[test]
#[cfg(unix)]
fn unreadable_subdirectory_is_skipped_when_permissive() {
    use std::os::unix::fs::PermissionsExt;

    let root = TempDir::new().expect("tempdir");
    package(root.path(), "fine", "backend \"A\" { format \"csv\" }");
    let locked = root.path().join("locked");
    fs::create_dir_all(&locked).expect("create dir");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("lock dir");

    let manager = BackendManager::new(root.path(), false).expect("manager");
    assert_eq!(&["A".to_string()], manager.backends());

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("unlock dir");
}

#[test]
fn one_package_may_publish_several_backends() {
    let root = TempDir::new().expect("tempdir");
    package(
        root.path(),
        "multi",
        "backend \"A\" { format \"csv\" }\nbackend \"B\" { format \"xml\" }",
    );

    let manager = BackendManager::new(root.path(), true).expect("manager");
    assert_eq!(&["A".to_string(), "B".to_string()], manager.backends());
}

#[test]
fn sibling_definitions_stay_private_unless_imported() {
    let root = TempDir::new().expect("tempdir");
    package(root.path(), "pkg", "backend \"C\" { format \"csv\" }");
    fs::write(
        root.path().join("pkg/helpers.kdl"),
        "backend \"D\" { format \"csv\" }",
    )
    .expect("write sibling");

    let manager = BackendManager::new(root.path(), true).expect("manager");
    assert_eq!(&["C".to_string()], manager.backends());
}

#[test]
fn imported_siblings_are_published() {
    let root = TempDir::new().expect("tempdir");
    package(
        root.path(),
        "pkg",
        "backend \"C\" { format \"csv\" }\nimport \"helpers.kdl\"",
    );
    fs::write(
        root.path().join("pkg/helpers.kdl"),
        "backend \"D\" { format \"csv\" }",
    )
    .expect("write sibling");

    let manager = BackendManager::new(root.path(), true).expect("manager");
    assert_eq!(&["C".to_string(), "D".to_string()], manager.backends());
}

#[test]
fn packages_in_subdirectories_are_aggregated() {
    let root = TempDir::new().expect("tempdir");
    package(root.path(), "top", "backend \"A\" { format \"csv\" }");
    package(
        &root.path().join("group"),
        "nested",
        "backend \"B\" { format \"csv\" }",
    );

    let manager = BackendManager::new(root.path(), true).expect("manager");
    assert_eq!(&["A".to_string(), "B".to_string()], manager.backends());
}

#[test]
fn manager_reports_its_configuration() {
    let root = TempDir::new().expect("tempdir");
    let manager = BackendManager::new(root.path(), true).expect("manager");
    assert_eq!(root.path(), manager.path());
    assert!(manager.strict());

    let manager = BackendManager::new(root.path(), false).expect("manager");
    assert!(!manager.strict());
}

#[test]
fn built_ins_join_the_discovered_catalogue() {
    let root = TempDir::new().expect("tempdir");
    package(root.path(), "pkg", "backend \"A\" { format \"csv\" }");

    let manager = BackendManager::with_registry(BackendRegistry::default(), root.path(), true)
        .expect("manager");
    assert_eq!(&["A".to_string(), "taiga".to_string()], manager.backends());
}

#[test]
fn get_returns_the_same_instance_every_time() {
    let root = TempDir::new().expect("tempdir");
    package(root.path(), "pkg", "backend \"A\" { format \"csv\" }");

    let manager = BackendManager::with_registry(BackendRegistry::default(), root.path(), true)
        .expect("manager");

    let first = manager.get("A").expect("instantiates");
    let second = manager.get("A").expect("cached");
    assert!(Arc::ptr_eq(&first, &second));

    let taiga = manager.get("taiga").expect("built-in");
    assert!(Arc::ptr_eq(&taiga, &manager.get("taiga").expect("cached")));
    assert!(!Arc::ptr_eq(&first, &taiga));
}

#[test]
fn get_unknown_backend_is_an_error() {
    let root = TempDir::new().expect("tempdir");
    let manager = BackendManager::new(root.path(), true).expect("manager");

    let err = manager.get("bugzilla").unwrap_err();
    assert!(matches!(err, RastroError::BackendNotFound { .. }));
    assert_eq!("backend bugzilla not found.", err.to_string());
}

#[test]
fn failed_lookups_do_not_disturb_later_ones() {
    let root = TempDir::new().expect("tempdir");
    package(root.path(), "pkg", "backend \"A\" { format \"csv\" }");

    let manager = BackendManager::new(root.path(), true).expect("manager");
    assert!(manager.get("missing").is_err());

    let instance = manager.get("A").expect("still instantiates");
    assert_eq!("A", instance.name());
}
