/// Disk-backed content provider.
///
/// Revisions come from file metadata: the (modification time, size)
/// fingerprint of each path is mapped onto a per-provider monotonic counter.
/// A new fingerprint always yields a strictly greater revision than any
/// previously issued one.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::engine_bail;
use super::content_provider::{Content, ContentProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified_nanos: u128,
    len: u64,
}

struct RevisionTable {
    next_revision: u64,
    entries: FxHashMap<PathBuf, (Fingerprint, u64)>,
}

pub struct FileContentProvider {
    revisions: Mutex<RevisionTable>,
}

impl FileContentProvider {
    pub fn new() -> Self {
        Self {
            revisions: Mutex::new(RevisionTable {
                next_revision: 1,
                entries: FxHashMap::default(),
            }),
        }
    }

    /// Forget the fingerprint of `path` so its next query issues a new revision
    ///
    /// Used when a change is known to have happened but may be invisible to
    /// coarse file-system timestamps.
    pub fn invalidate(&self, path: &Path) {
        self.revisions.lock().entries.remove(path);
    }

    fn fingerprint(path: &Path) -> Result<Fingerprint> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            engine_bail!(NotFound => "galaxy3d::FileContentProvider",
                "{} is not a file", path.display());
        }
        let modified_nanos = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Ok(Fingerprint {
            modified_nanos,
            len: metadata.len(),
        })
    }
}

impl Default for FileContentProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentProvider for FileContentProvider {
    fn content(&self, path: &Path) -> Result<Content> {
        let bytes = std::fs::read(path).map_err(Error::from)?;
        let revision = self.revision(path)?;
        Ok(Content::new(bytes, revision))
    }

    fn revision(&self, path: &Path) -> Result<u64> {
        let fingerprint = Self::fingerprint(path)?;
        let mut table = self.revisions.lock();

        if let Some((known, revision)) = table.entries.get(path) {
            if *known == fingerprint {
                return Ok(*revision);
            }
        }

        let revision = table.next_revision;
        table.next_revision += 1;
        table.entries.insert(path.to_path_buf(), (fingerprint, revision));
        Ok(revision)
    }

    fn store(&self, path: &Path, bytes: &[u8]) -> Result<u64> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        // Same-size rewrites within the timestamp resolution keep their fingerprint
        self.invalidate(path);
        self.revision(path)
    }
}

#[cfg(test)]
#[path = "file_content_provider_tests.rs"]
mod tests;
