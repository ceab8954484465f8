/// File system search service.
///
/// Keeps an ordered list of search roots. A relative resource name is
/// looked up under each root in registration order; the first existing
/// file wins. The engine owns one shared instance, resolvers hold an `Arc`.

use std::path::{Path, PathBuf};
use parking_lot::RwLock;
use crate::engine_debug;
use super::path_resolver::normalize_path;

pub struct FileSystem {
    search_roots: RwLock<Vec<PathBuf>>,
}

impl FileSystem {
    /// Create a file system with no search roots
    pub fn new() -> Self {
        Self {
            search_roots: RwLock::new(Vec::new()),
        }
    }

    /// Register a search root
    ///
    /// Roots are normalized; registering the same root twice is a no-op.
    /// Returns false if the root was already registered.
    pub fn add_search_root(&self, root: impl AsRef<Path>) -> bool {
        let root = normalize_path(root.as_ref());
        let mut roots = self.search_roots.write();
        if roots.contains(&root) {
            return false;
        }
        engine_debug!("galaxy3d::FileSystem", "Search root added: {}", root.display());
        roots.push(root);
        true
    }

    /// Unregister a search root. Returns false if it was not registered.
    pub fn remove_search_root(&self, root: impl AsRef<Path>) -> bool {
        let root = normalize_path(root.as_ref());
        let mut roots = self.search_roots.write();
        let before = roots.len();
        roots.retain(|r| r != &root);
        roots.len() != before
    }

    /// Snapshot of the registered roots, in search order
    pub fn search_roots(&self) -> Vec<PathBuf> {
        self.search_roots.read().clone()
    }

    /// Remove all search roots
    pub fn clear(&self) {
        self.search_roots.write().clear();
    }

    /// Find `relative` under the registered roots
    ///
    /// Absolute names are only checked for existence.
    pub fn find(&self, relative: impl AsRef<Path>) -> Option<PathBuf> {
        let relative = relative.as_ref();
        if relative.is_absolute() {
            return relative.is_file().then(|| normalize_path(relative));
        }

        self.search_roots
            .read()
            .iter()
            .map(|root| normalize_path(&root.join(relative)))
            .find(|candidate| candidate.is_file())
    }
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "file_system_tests.rs"]
mod tests;
