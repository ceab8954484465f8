/// In-memory content provider.
///
/// Holds files as byte buffers keyed by path. Every `insert` bumps the
/// revision of that path, so tools and tests get deterministic change
/// detection without touching the disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_bail;
use super::content_provider::{Content, ContentProvider};

pub struct MemoryContentProvider {
    files: RwLock<FxHashMap<PathBuf, Content>>,
    next_revision: RwLock<u64>,
}

impl MemoryContentProvider {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(FxHashMap::default()),
            next_revision: RwLock::new(1),
        }
    }

    /// Store (or overwrite) a file; returns its new revision
    pub fn insert(&self, path: impl Into<PathBuf>, bytes: impl Into<Arc<[u8]>>) -> u64 {
        let revision = {
            let mut next = self.next_revision.write();
            let revision = *next;
            *next += 1;
            revision
        };
        self.files.write().insert(path.into(), Content::new(bytes, revision));
        revision
    }

    /// Remove a file. Returns false if it did not exist.
    pub fn remove(&self, path: &Path) -> bool {
        self.files.write().remove(path).is_some()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }

    pub fn file_count(&self) -> usize {
        self.files.read().len()
    }
}

impl Default for MemoryContentProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentProvider for MemoryContentProvider {
    fn content(&self, path: &Path) -> Result<Content> {
        match self.files.read().get(path) {
            Some(content) => Ok(content.clone()),
            None => engine_bail!(NotFound => "galaxy3d::MemoryContentProvider",
                "No content at {}", path.display()),
        }
    }

    fn revision(&self, path: &Path) -> Result<u64> {
        self.content(path).map(|c| c.revision())
    }

    fn store(&self, path: &Path, bytes: &[u8]) -> Result<u64> {
        Ok(self.insert(path, bytes))
    }
}

#[cfg(test)]
#[path = "memory_content_provider_tests.rs"]
mod tests;
