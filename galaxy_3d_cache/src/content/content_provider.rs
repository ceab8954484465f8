/// Content provider trait and the content value it returns.

use std::path::Path;
use std::sync::Arc;
use crate::error::{Error, Result};

/// Bytes read from a source, stamped with the revision they were read at
#[derive(Debug, Clone)]
pub struct Content {
    bytes: Arc<[u8]>,
    revision: u64,
}

impl Content {
    pub fn new(bytes: impl Into<Arc<[u8]>>, revision: u64) -> Self {
        Self {
            bytes: bytes.into(),
            revision,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Interpret the content as UTF-8 text
    ///
    /// # Errors
    ///
    /// `MalformedDocument` if the bytes are not valid UTF-8.
    pub fn as_text(&self) -> Result<&str> {
        std::str::from_utf8(&self.bytes)
            .map_err(|e| Error::MalformedDocument(format!("content is not UTF-8: {}", e)))
    }
}

/// Source of resource bytes
///
/// Calls are synchronous; the caller absorbs any I/O latency.
pub trait ContentProvider: Send + Sync {
    /// Read the full content at `path`
    ///
    /// # Errors
    ///
    /// `NotFound` if nothing exists at `path`, `Io` for other failures.
    fn content(&self, path: &Path) -> Result<Content>;

    /// Current revision of `path`, without reading its bytes
    fn revision(&self, path: &Path) -> Result<u64>;

    /// Write `bytes` at `path`, replacing any previous content
    ///
    /// Returns the revision `content` reports for the stored bytes.
    fn store(&self, path: &Path, bytes: &[u8]) -> Result<u64>;
}
