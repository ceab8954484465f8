//! Path resolution module
//!
//! Turns logical resource names into absolute source locations.
//! Two strategies are provided: plain normalization of absolute or
//! cwd-relative names, and a search through the registered roots of a
//! shared `FileSystem`.

mod file_system;
mod path_resolver;

pub use file_system::FileSystem;
pub use path_resolver::{
    PathResolver, AbsolutePathResolver, FileSystemPathResolver,
    normalize_path,
};
