/// Shared resource cells.
///
/// A cached resource lives in an `Arc<Resource<T>>`. The cache holds one
/// strong reference; any number of external holders may hold more. The cell
/// records which cache owns it and that cache's manager (both set once, on
/// insertion), guards the data with a read/write lock, and lazily creates the
/// set of resources depending on it.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use slotmap::new_key_type;
use crate::error::Result;
use crate::content::Content;
use crate::resource::ResourceManager;
use super::dependency::{DependencyNode, DependencySet};

// ===== KEYS =====

new_key_type! {
    /// Stable key of an entry inside one resource cache.
    ///
    /// Keys stay valid when other entries are removed; a key becomes invalid
    /// only when its own entry is removed.
    pub struct ResourceKey;
}

/// Process-unique identifier of a cache instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheId(u64);

impl CacheId {
    pub(crate) fn next() -> Self {
        static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(1);
        CacheId(NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Link from a resource to the cache entry that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceOwner {
    pub cache: CacheId,
    pub key: ResourceKey,
}

// ===== LOADING CONTEXT =====

/// Everything a resource type sees while parsing its source
pub struct LoadContext<'a> {
    /// Resolved absolute path of the source
    pub path: &'a Path,
    /// Bytes and revision read from the content provider
    pub content: &'a Content,
    /// Manager owning the loading cache, used to reach sibling caches and the device
    pub manager: Option<Arc<ResourceManager>>,
}

// ===== RESOURCE DATA =====

/// Behavior every cached resource type provides
pub trait ResourceData: Send + Sync + Sized + 'static {
    /// Kind label used in log messages ("Material", "Mesh"...)
    const KIND: &'static str;

    /// Build a resource from file content
    fn load(ctx: &LoadContext<'_>) -> Result<Self>;

    /// Resources this one was built from
    ///
    /// The cache registers an edge from each of them to this resource so
    /// that their changes reach it through `notify_dependents`.
    fn dependencies(&self) -> Vec<Arc<dyn DependencyNode>> {
        Vec::new()
    }

    /// Refresh hook, invoked at most once per notification walk
    ///
    /// `manager` is the manager of the owning cache, when it is still alive.
    /// A reloaded or replaced dependency is a new instance; hooks holding the
    /// old one re-resolve it through `manager`.
    fn on_dependency_changed(&mut self, _manager: Option<&ResourceManager>) {}

    /// Whether just-in-time work is pending (device upload, compilation)
    fn needs_commit(&self) -> bool {
        false
    }

    /// Perform the pending just-in-time work
    fn commit(&mut self) -> Result<()> {
        Ok(())
    }
}

// ===== RESOURCE CELL =====

pub struct Resource<T> {
    owner: OnceLock<ResourceOwner>,
    manager: OnceLock<Weak<ResourceManager>>,
    data: RwLock<T>,
    dependents: OnceLock<DependencySet>,
}

/// Shared handle to a cached resource
pub type ResourceRef<T> = Arc<Resource<T>>;

impl<T> Resource<T> {
    /// Wrap data in a new, unowned resource cell
    pub fn new(data: T) -> ResourceRef<T> {
        Arc::new(Self {
            owner: OnceLock::new(),
            manager: OnceLock::new(),
            data: RwLock::new(data),
            dependents: OnceLock::new(),
        })
    }

    /// Shared access to the data
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.data.read()
    }

    /// Exclusive access to the data
    ///
    /// Changes made here are not announced; prefer `ResourceCache::edit`, or
    /// call `ResourceCache::mark_dirty` afterwards.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.data.write()
    }

    /// Owning cache entry, if the resource was ever inserted into a cache
    pub fn owner(&self) -> Option<ResourceOwner> {
        self.owner.get().copied()
    }

    /// Record the owning cache entry. Returns false if an owner was already set.
    pub(crate) fn set_owner(&self, owner: ResourceOwner) -> bool {
        self.owner.set(owner).is_ok()
    }

    /// Record the manager of the owning cache. Ignored if one was already set.
    pub(crate) fn attach_manager(&self, manager: &Weak<ResourceManager>) {
        let _ = self.manager.set(manager.clone());
    }

    /// Resources depending on this one (created on first access)
    pub fn dependencies(&self) -> &DependencySet {
        self.dependents.get_or_init(DependencySet::new)
    }

    /// Dependents set, without creating it
    pub fn dependencies_if_any(&self) -> Option<&DependencySet> {
        self.dependents.get()
    }
}

impl<T: ResourceData> DependencyNode for Resource<T> {
    fn dependents(&self) -> Option<&DependencySet> {
        self.dependents.get()
    }

    fn dependency_set(&self) -> &DependencySet {
        self.dependencies()
    }

    fn upstream(&self) -> Vec<Arc<dyn DependencyNode>> {
        self.data.read().dependencies()
    }

    fn on_dependency_changed(&self) {
        let manager = self.manager.get().and_then(Weak::upgrade);
        self.data.write().on_dependency_changed(manager.as_deref());
    }

    fn kind(&self) -> &'static str {
        T::KIND
    }
}

/// Convert a typed handle into a dependency node handle
pub fn as_node<T: ResourceData>(resource: &ResourceRef<T>) -> Arc<dyn DependencyNode> {
    resource.clone()
}
