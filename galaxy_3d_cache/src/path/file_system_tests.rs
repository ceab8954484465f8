/// Tests for FileSystem
///
/// These tests validate search root registration and lookup order.

use super::*;
use std::fs;

#[test]
fn test_file_system_new_is_empty() {
    let fs = FileSystem::new();
    assert!(fs.search_roots().is_empty());
    assert!(fs.find("anything.mat").is_none());
}

#[test]
fn test_add_search_root_deduplicates() {
    let dir = tempfile::tempdir().unwrap();
    let fs = FileSystem::new();
    assert!(fs.add_search_root(dir.path()));
    assert!(!fs.add_search_root(dir.path()));
    assert_eq!(fs.search_roots().len(), 1);
}

#[test]
fn test_remove_search_root() {
    let dir = tempfile::tempdir().unwrap();
    let fs = FileSystem::new();
    fs.add_search_root(dir.path());
    assert!(fs.remove_search_root(dir.path()));
    assert!(!fs.remove_search_root(dir.path()));
    assert!(fs.search_roots().is_empty());
}

#[test]
fn test_find_uses_registration_order() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    fs::write(first.path().join("shared.mat"), "<material/>").unwrap();
    fs::write(second.path().join("shared.mat"), "<material/>").unwrap();
    fs::write(second.path().join("only_second.mat"), "<material/>").unwrap();

    let fs = FileSystem::new();
    fs.add_search_root(first.path());
    fs.add_search_root(second.path());

    let shared = fs.find("shared.mat").unwrap();
    assert!(shared.starts_with(normalize_path(first.path())));

    let only = fs.find("only_second.mat").unwrap();
    assert!(only.starts_with(normalize_path(second.path())));

    assert!(fs.find("missing.mat").is_none());
}

#[test]
fn test_find_ignores_directories() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir(root.path().join("textures")).unwrap();

    let fs = FileSystem::new();
    fs.add_search_root(root.path());
    assert!(fs.find("textures").is_none());
}
