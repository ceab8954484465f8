//! Content provider module
//!
//! Yields the bytes behind a resolved path together with a revision stamp.
//! Revisions are cheap to query and change whenever the bytes change, which
//! lets caches detect stale entries without re-reading content.

mod content_provider;
mod file_content_provider;
mod memory_content_provider;

pub use content_provider::{Content, ContentProvider};
pub use file_content_provider::FileContentProvider;
pub use memory_content_provider::MemoryContentProvider;
