/// Path resolvers.
///
/// A `PathResolver` maps a logical resource name to an absolute path.
/// Resolvers are value-like strategy objects: cloning one (through
/// `dyn_clone::clone_box`) yields an independent resolver with the same
/// configuration.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use dyn_clone::DynClone;
use crate::error::Result;
use crate::{engine_bail, engine_trace};
use super::file_system::FileSystem;

// ===== TRAIT =====

pub trait PathResolver: DynClone + Send + Sync {
    /// Resolve `name` to an absolute path
    ///
    /// When nothing matches, returns `NotFound` if `throw_on_failure`,
    /// otherwise an empty path.
    fn resolve(&self, name: &str, throw_on_failure: bool) -> Result<PathBuf>;
}

dyn_clone::clone_trait_object!(PathResolver);

// ===== HELPERS =====

/// Lexically normalize a path: make it absolute against the current
/// directory and fold `.` and `..` components. The file system is not touched.
pub fn normalize_path(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

// ===== ABSOLUTE RESOLVER =====

/// Identity resolver: normalizes absolute or cwd-relative names
///
/// Only reports failure for empty names; existence is not checked.
#[derive(Debug, Clone, Default)]
pub struct AbsolutePathResolver;

impl AbsolutePathResolver {
    pub fn new() -> Self {
        Self
    }
}

impl PathResolver for AbsolutePathResolver {
    fn resolve(&self, name: &str, throw_on_failure: bool) -> Result<PathBuf> {
        if name.is_empty() {
            if throw_on_failure {
                engine_bail!(NotFound => "galaxy3d::PathResolver", "Cannot resolve an empty name");
            }
            return Ok(PathBuf::new());
        }
        Ok(normalize_path(Path::new(name)))
    }
}

// ===== FILE SYSTEM RESOLVER =====

/// Search resolver
///
/// First checks whether `name` already denotes an existing file (absolute,
/// or relative to the base directory), then falls back to the search roots
/// of the shared `FileSystem`.
#[derive(Clone)]
pub struct FileSystemPathResolver {
    base: PathBuf,
    file_system: Arc<FileSystem>,
}

impl FileSystemPathResolver {
    pub fn new(base: impl AsRef<Path>, file_system: Arc<FileSystem>) -> Self {
        Self {
            base: normalize_path(base.as_ref()),
            file_system,
        }
    }

    /// Base directory checked before the search roots
    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn file_system(&self) -> &Arc<FileSystem> {
        &self.file_system
    }
}

impl PathResolver for FileSystemPathResolver {
    fn resolve(&self, name: &str, throw_on_failure: bool) -> Result<PathBuf> {
        if !name.is_empty() {
            let direct = normalize_path(&self.base.join(name));
            if direct.is_file() {
                return Ok(direct);
            }

            if let Some(found) = self.file_system.find(name) {
                engine_trace!("galaxy3d::PathResolver", "'{}' found at {}", name, found.display());
                return Ok(found);
            }
        }

        if throw_on_failure {
            engine_bail!(NotFound => "galaxy3d::PathResolver",
                "'{}' not found under {} or any search root", name, self.base.display());
        }
        Ok(PathBuf::new())
    }
}

#[cfg(test)]
#[path = "path_resolver_tests.rs"]
mod tests;
