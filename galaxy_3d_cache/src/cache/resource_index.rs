/// ResourceIndex - keyed store of resources of one type.
///
/// Entries live in a SlotMap with stable keys. Two hash maps bind unique
/// names and unique files to keys, and an IndexSet remembers insertion order
/// for enumeration. The index owns the only strong reference held by the
/// cache; callers receive clones of the `Arc`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use crate::error::Result;
use crate::{engine_bail, engine_warn};
use super::resource::{CacheId, ResourceKey, ResourceOwner, ResourceRef};

// ===== BINDINGS =====

/// How a name or file collision is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingPolicy {
    /// The new binding wins; the previous holder becomes anonymous
    #[default]
    Evict,
    /// The binding fails with `AlreadyExists`
    Reject,
}

/// Addressability of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    /// Neither named nor filed
    Unknown,
    /// Reachable by name only
    Named,
    /// Bound to a source file
    Filed,
}

/// Bindings of one entry. Empty values mean "unbound".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceInfo {
    pub name: String,
    pub file: PathBuf,
    /// Content revision the resource was loaded from (0 for in-memory resources)
    pub revision: u64,
}

impl ResourceInfo {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn filed(file: impl Into<PathBuf>, revision: u64) -> Self {
        Self {
            file: file.into(),
            revision,
            ..Self::default()
        }
    }

    pub fn state(&self) -> ComponentState {
        if !self.file.as_os_str().is_empty() {
            ComponentState::Filed
        } else if !self.name.is_empty() {
            ComponentState::Named
        } else {
            ComponentState::Unknown
        }
    }
}

/// Snapshot row returned by `ResourceIndex::info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSummary {
    pub key: ResourceKey,
    pub name: String,
    pub file: PathBuf,
    pub revision: u64,
    pub state: ComponentState,
}

struct IndexEntry<T> {
    resource: ResourceRef<T>,
    info: ResourceInfo,
}

// ===== INDEX =====

pub struct ResourceIndex<T> {
    /// Identity stamped into the owner link of inserted resources
    cache_id: CacheId,
    /// Collision handling for plain `set_name`/`set_file`
    policy: BindingPolicy,
    /// Entries with stable keys
    entries: SlotMap<ResourceKey, IndexEntry<T>>,
    /// Keys in insertion order
    order: IndexSet<ResourceKey>,
    /// Unique non-empty names
    by_name: FxHashMap<String, ResourceKey>,
    /// Unique non-empty files
    by_file: FxHashMap<PathBuf, ResourceKey>,
}

impl<T> ResourceIndex<T> {
    pub fn new(cache_id: CacheId, policy: BindingPolicy) -> Self {
        Self {
            cache_id,
            policy,
            entries: SlotMap::with_key(),
            order: IndexSet::new(),
            by_name: FxHashMap::default(),
            by_file: FxHashMap::default(),
        }
    }

    pub fn cache_id(&self) -> CacheId {
        self.cache_id
    }

    pub fn policy(&self) -> BindingPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: BindingPolicy) {
        self.policy = policy;
    }

    // ===== INSERT / REMOVE =====

    /// Insert a resource with its initial bindings
    ///
    /// Fails with `AlreadyExists` if the resource already has an owner, or if
    /// a binding collides while the policy is `Reject`.
    pub fn insert(&mut self, resource: ResourceRef<T>, info: ResourceInfo) -> Result<ResourceKey> {
        if let Some(owner) = resource.owner() {
            engine_bail!(AlreadyExists => "galaxy3d::ResourceIndex",
                "Resource is already owned by cache #{}", owner.cache.raw());
        }
        if self.policy == BindingPolicy::Reject {
            if !info.name.is_empty() && self.by_name.contains_key(&info.name) {
                engine_bail!(AlreadyExists => "galaxy3d::ResourceIndex",
                    "Name '{}' is already bound", info.name);
            }
            if !info.file.as_os_str().is_empty() && self.by_file.contains_key(&info.file) {
                engine_bail!(AlreadyExists => "galaxy3d::ResourceIndex",
                    "File '{}' is already bound", info.file.display());
            }
        }

        let cache_id = self.cache_id;
        let key = self.entries.insert_with_key(|key| {
            resource.set_owner(ResourceOwner { cache: cache_id, key });
            IndexEntry {
                resource,
                info: ResourceInfo { revision: info.revision, ..ResourceInfo::default() },
            }
        });
        self.order.insert(key);

        // Collisions were rejected above, so these only evict
        self.bind_name(key, &info.name, BindingPolicy::Evict)?;
        self.bind_file(key, &info.file, BindingPolicy::Evict)?;
        Ok(key)
    }

    /// Remove an entry, dropping its bindings
    pub fn remove(&mut self, key: ResourceKey) -> Option<ResourceRef<T>> {
        let entry = self.entries.remove(key)?;
        self.order.shift_remove(&key);
        if !entry.info.name.is_empty() {
            self.by_name.remove(&entry.info.name);
        }
        if !entry.info.file.as_os_str().is_empty() {
            self.by_file.remove(&entry.info.file);
        }
        Some(entry.resource)
    }

    /// Remove every entry, returning the resources in insertion order
    pub fn clear(&mut self) -> Vec<ResourceRef<T>> {
        let order = std::mem::take(&mut self.order);
        let mut removed = Vec::with_capacity(order.len());
        for key in order {
            if let Some(entry) = self.entries.remove(key) {
                removed.push(entry.resource);
            }
        }
        self.entries.clear();
        self.by_name.clear();
        self.by_file.clear();
        removed
    }

    // ===== BINDINGS =====

    /// Bind `name` to an entry using the index policy. An empty name clears the binding.
    pub fn set_name(&mut self, key: ResourceKey, name: &str) -> Result<()> {
        self.bind_name(key, name, self.policy)
    }

    pub fn set_name_with(&mut self, key: ResourceKey, name: &str, policy: BindingPolicy) -> Result<()> {
        self.bind_name(key, name, policy)
    }

    /// Bind `file` to an entry using the index policy. An empty path clears the binding.
    pub fn set_file(&mut self, key: ResourceKey, file: &Path) -> Result<()> {
        self.bind_file(key, file, self.policy)
    }

    pub fn set_file_with(&mut self, key: ResourceKey, file: &Path, policy: BindingPolicy) -> Result<()> {
        self.bind_file(key, file, policy)
    }

    /// Update the stored content revision of an entry
    pub fn set_revision(&mut self, key: ResourceKey, revision: u64) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.info.revision = revision;
                true
            }
            None => false,
        }
    }

    fn bind_name(&mut self, key: ResourceKey, name: &str, policy: BindingPolicy) -> Result<()> {
        let Some(entry) = self.entries.get(key) else {
            engine_bail!(NotFound => "galaxy3d::ResourceIndex", "No entry for key {:?}", key);
        };
        if entry.info.name == name {
            return Ok(());
        }

        if !name.is_empty() {
            if let Some(&holder) = self.by_name.get(name) {
                match policy {
                    BindingPolicy::Reject => {
                        engine_bail!(AlreadyExists => "galaxy3d::ResourceIndex",
                            "Name '{}' is already bound", name);
                    }
                    BindingPolicy::Evict => {
                        engine_warn!("galaxy3d::ResourceIndex",
                            "Name '{}' moved to a new resource; previous holder is now unnamed", name);
                        if let Some(previous) = self.entries.get_mut(holder) {
                            previous.info.name.clear();
                        }
                    }
                }
            }
        }

        let Some(entry) = self.entries.get_mut(key) else {
            engine_bail!(NotFound => "galaxy3d::ResourceIndex", "No entry for key {:?}", key);
        };
        let old = std::mem::replace(&mut entry.info.name, name.to_string());
        if !old.is_empty() {
            self.by_name.remove(&old);
        }
        if !name.is_empty() {
            self.by_name.insert(name.to_string(), key);
        }
        Ok(())
    }

    fn bind_file(&mut self, key: ResourceKey, file: &Path, policy: BindingPolicy) -> Result<()> {
        let Some(entry) = self.entries.get(key) else {
            engine_bail!(NotFound => "galaxy3d::ResourceIndex", "No entry for key {:?}", key);
        };
        if entry.info.file == file {
            return Ok(());
        }

        let bound = !file.as_os_str().is_empty();
        if bound {
            if let Some(&holder) = self.by_file.get(file) {
                match policy {
                    BindingPolicy::Reject => {
                        engine_bail!(AlreadyExists => "galaxy3d::ResourceIndex",
                            "File '{}' is already bound", file.display());
                    }
                    BindingPolicy::Evict => {
                        engine_warn!("galaxy3d::ResourceIndex",
                            "File '{}' moved to a new resource; previous holder is now unfiled",
                            file.display());
                        if let Some(previous) = self.entries.get_mut(holder) {
                            previous.info.file = PathBuf::new();
                            previous.info.revision = 0;
                        }
                    }
                }
            }
        }

        let Some(entry) = self.entries.get_mut(key) else {
            engine_bail!(NotFound => "galaxy3d::ResourceIndex", "No entry for key {:?}", key);
        };
        let old = std::mem::replace(&mut entry.info.file, file.to_path_buf());
        if !old.as_os_str().is_empty() {
            self.by_file.remove(&old);
        }
        if bound {
            self.by_file.insert(file.to_path_buf(), key);
        }
        Ok(())
    }

    /// Hand the bindings of `old` over to `new`, then remove `old`
    ///
    /// `new` takes the display position of `old`; any bindings `new` had
    /// before are dropped. Returns the removed resource.
    pub fn replace(&mut self, old: ResourceKey, new: ResourceKey) -> Result<ResourceRef<T>> {
        if old == new {
            engine_bail!(InvalidParameter => "galaxy3d::ResourceIndex",
                "Cannot replace an entry with itself");
        }
        if !self.entries.contains_key(new) {
            engine_bail!(NotFound => "galaxy3d::ResourceIndex", "No entry for key {:?}", new);
        }
        let Some(position) = self.order.get_index_of(&old) else {
            engine_bail!(NotFound => "galaxy3d::ResourceIndex", "No entry for key {:?}", old);
        };

        let info = match self.entries.get(old) {
            Some(entry) => entry.info.clone(),
            None => engine_bail!(NotFound => "galaxy3d::ResourceIndex", "No entry for key {:?}", old),
        };

        // Unbind both sides, then rebind the old identity onto the new entry
        self.bind_name(new, "", BindingPolicy::Evict)?;
        self.bind_file(new, Path::new(""), BindingPolicy::Evict)?;
        let Some(removed) = self.remove(old) else {
            engine_bail!(NotFound => "galaxy3d::ResourceIndex", "No entry for key {:?}", old);
        };
        self.bind_name(new, &info.name, BindingPolicy::Evict)?;
        self.bind_file(new, &info.file, BindingPolicy::Evict)?;
        self.set_revision(new, info.revision);

        let mut target = position;
        if let Some(current) = self.order.get_index_of(&new) {
            if current < position {
                target -= 1;
            }
            self.order.shift_remove(&new);
        }
        self.order.shift_insert(target.min(self.order.len()), new);
        Ok(removed)
    }

    // ===== LOOKUP =====

    pub fn get(&self, key: ResourceKey) -> Option<&ResourceRef<T>> {
        self.entries.get(key).map(|entry| &entry.resource)
    }

    pub fn info_of(&self, key: ResourceKey) -> Option<&ResourceInfo> {
        self.entries.get(key).map(|entry| &entry.info)
    }

    pub fn contains(&self, key: ResourceKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn key_by_name(&self, name: &str) -> Option<ResourceKey> {
        self.by_name.get(name).copied()
    }

    pub fn key_by_file(&self, file: &Path) -> Option<ResourceKey> {
        self.by_file.get(file).copied()
    }

    /// Find a resource by name
    ///
    /// A miss returns `NotFound` if `throw_on_failure`, otherwise `None`.
    pub fn by_name(&self, name: &str, throw_on_failure: bool) -> Result<Option<ResourceRef<T>>> {
        match self.key_by_name(name).and_then(|key| self.get(key)) {
            Some(resource) => Ok(Some(resource.clone())),
            None if throw_on_failure => {
                engine_bail!(NotFound => "galaxy3d::ResourceIndex", "No resource named '{}'", name)
            }
            None => Ok(None),
        }
    }

    /// Find a resource by resolved file path
    pub fn by_file(&self, file: &Path, throw_on_failure: bool) -> Result<Option<ResourceRef<T>>> {
        match self.key_by_file(file).and_then(|key| self.get(key)) {
            Some(resource) => Ok(Some(resource.clone())),
            None if throw_on_failure => {
                engine_bail!(NotFound => "galaxy3d::ResourceIndex",
                    "No resource bound to '{}'", file.display())
            }
            None => Ok(None),
        }
    }

    /// Key of a resource, if this index owns it
    pub fn key_of(&self, resource: &ResourceRef<T>) -> Option<ResourceKey> {
        let owner = resource.owner()?;
        if owner.cache != self.cache_id {
            return None;
        }
        let entry = self.entries.get(owner.key)?;
        Arc::ptr_eq(&entry.resource, resource).then_some(owner.key)
    }

    // ===== ENUMERATION =====

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.order.iter().copied()
    }

    /// Resources in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKey, &ResourceRef<T>, &ResourceInfo)> + '_ {
        self.order.iter().filter_map(|&key| {
            self.entries.get(key).map(|entry| (key, &entry.resource, &entry.info))
        })
    }

    /// Snapshot of every entry, in insertion order
    pub fn info(&self) -> Vec<ResourceSummary> {
        self.iter()
            .map(|(key, _, info)| ResourceSummary {
                key,
                name: info.name.clone(),
                file: info.file.clone(),
                revision: info.revision,
                state: info.state(),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "resource_index_tests.rs"]
mod tests;
