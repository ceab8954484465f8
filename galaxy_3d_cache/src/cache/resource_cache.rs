/// ResourceCache - per-type cache of shared resources.
///
/// Wraps a `ResourceIndex` with on-demand loading: `get_by_file` resolves a
/// logical name, compares the stored content revision with the provider's,
/// and either returns the cached instance or loads a fresh one. Edits are
/// two-phase: mutate freely (`edit`), then call `notify_dependents` once to
/// refresh everything built from the edited resources.
///
/// All methods take `&self`. Internal locks are released before loaders
/// and refresh hooks run, so a load may look up resources in this or any
/// other cache of the same manager.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use parking_lot::{Mutex, RwLock};
use crate::error::{Error, Result};
use crate::component::property::{self, Reflect};
use crate::content::ContentProvider;
use crate::path::{normalize_path, PathResolver};
use crate::resource::ResourceManager;
use crate::{engine_bail, engine_debug, engine_trace};
use super::component_monitor::ComponentMonitor;
use super::dependency::{self, DependencyNode};
use super::resource::{as_node, CacheId, LoadContext, Resource, ResourceData, ResourceKey, ResourceRef};
use super::resource_index::{BindingPolicy, ComponentState, ResourceIndex, ResourceInfo, ResourceSummary};

// ===== DESCRIPTOR =====

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheDesc {
    /// Label used in log messages
    pub label: String,
    /// Collision handling for `set_name`/`set_file`
    pub binding_policy: BindingPolicy,
}

impl Default for CacheDesc {
    fn default() -> Self {
        Self {
            label: "ResourceCache".to_string(),
            binding_policy: BindingPolicy::Evict,
        }
    }
}

impl CacheDesc {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

// ===== CACHE =====

pub struct ResourceCache<T: ResourceData> {
    label: String,
    cache_id: CacheId,
    index: RwLock<ResourceIndex<T>>,
    /// Resources edited or reloaded since the last `notify_dependents`
    dirty: Mutex<Vec<Weak<Resource<T>>>>,
    /// Resources with just-in-time work waiting for `commit`
    pending_commit: Mutex<Vec<Weak<Resource<T>>>>,
    resolver: Box<dyn PathResolver>,
    provider: Arc<dyn ContentProvider>,
    monitor: Arc<ComponentMonitor>,
    manager: Weak<ResourceManager>,
}

fn push_unique<T>(list: &Mutex<Vec<Weak<Resource<T>>>>, resource: &ResourceRef<T>) {
    let mut list = list.lock();
    list.retain(|w| w.strong_count() > 0);
    if !list.iter().any(|w| std::ptr::eq(w.as_ptr(), Arc::as_ptr(resource))) {
        list.push(Arc::downgrade(resource));
    }
}

impl<T: ResourceData> ResourceCache<T> {
    /// Create an empty cache
    ///
    /// # Arguments
    ///
    /// * `desc` - Label and binding policy
    /// * `resolver` - Maps logical names to absolute paths
    /// * `provider` - Supplies file bytes and revisions
    /// * `monitor` - Change counters shared with sibling caches
    pub fn new(
        desc: CacheDesc,
        resolver: Box<dyn PathResolver>,
        provider: Arc<dyn ContentProvider>,
        monitor: Arc<ComponentMonitor>,
    ) -> Self {
        let cache_id = CacheId::next();
        Self {
            label: desc.label,
            cache_id,
            index: RwLock::new(ResourceIndex::new(cache_id, desc.binding_policy)),
            dirty: Mutex::new(Vec::new()),
            pending_commit: Mutex::new(Vec::new()),
            resolver,
            provider,
            monitor,
            manager: Weak::new(),
        }
    }

    /// Attach the owning manager (loads receive it through `LoadContext`)
    pub(crate) fn with_manager(mut self, manager: Weak<ResourceManager>) -> Self {
        self.manager = manager;
        self
    }

    pub fn id(&self) -> CacheId {
        self.cache_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn monitor(&self) -> &Arc<ComponentMonitor> {
        &self.monitor
    }

    pub fn resolver(&self) -> &dyn PathResolver {
        self.resolver.as_ref()
    }

    pub fn provider(&self) -> &Arc<dyn ContentProvider> {
        &self.provider
    }

    pub fn manager(&self) -> Option<Arc<ResourceManager>> {
        self.manager.upgrade()
    }

    pub fn binding_policy(&self) -> BindingPolicy {
        self.index.read().policy()
    }

    pub fn set_binding_policy(&self, policy: BindingPolicy) {
        self.index.write().set_policy(policy);
    }

    // ===== INSERTION =====

    /// Wrap `data` in a new resource and insert it, optionally named
    pub fn create(&self, data: T, name: &str) -> Result<ResourceRef<T>> {
        let resource = Resource::new(data);
        self.insert(resource.clone(), ResourceInfo::named(name))?;
        Ok(resource)
    }

    /// Insert an unowned resource with its initial bindings
    pub fn insert(&self, resource: ResourceRef<T>, info: ResourceInfo) -> Result<ResourceKey> {
        let key = self.index.write().insert(resource.clone(), info)?;
        self.adopt(&resource);
        self.link_dependencies(&resource, &[]);
        self.track_commit(&resource);
        self.monitor.structure_changed();
        Ok(key)
    }

    // ===== LOOKUP =====

    pub fn get(&self, key: ResourceKey) -> Option<ResourceRef<T>> {
        self.index.read().get(key).cloned()
    }

    /// Find a resource by name
    ///
    /// A miss returns `NotFound` if `throw_on_failure`, otherwise `None`.
    pub fn get_by_name(&self, name: &str, throw_on_failure: bool) -> Result<Option<ResourceRef<T>>> {
        self.index.read().by_name(name, throw_on_failure)
    }

    /// Find or load the resource stored in `file`
    ///
    /// `file` is resolved through the cache's path resolver. A cached entry
    /// is returned only if its revision matches the provider's current one;
    /// otherwise the content is loaded again and the new instance replaces
    /// the stale one (bindings and dependents move over, and the new
    /// instance is marked dirty).
    ///
    /// Resolution failures honor `throw_on_failure`; content and parse
    /// errors are always returned.
    pub fn get_by_file(&self, file: &str, throw_on_failure: bool) -> Result<Option<ResourceRef<T>>> {
        let path = self.resolver.resolve(file, throw_on_failure)?;
        if path.as_os_str().is_empty() {
            return Ok(None);
        }

        let revision = match self.provider.revision(&path) {
            Ok(revision) => revision,
            Err(Error::NotFound(_)) if !throw_on_failure => return Ok(None),
            Err(err) => return Err(err),
        };

        let cached = {
            let index = self.index.read();
            index.key_by_file(&path).and_then(|key| {
                let info = index.info_of(key)?;
                let resource = index.get(key)?;
                Some((info.revision, resource.clone()))
            })
        };
        if let Some((stored, resource)) = cached {
            if stored == revision {
                engine_trace!("galaxy3d::ResourceCache", "[{}] Cache hit: {}", self.label, path.display());
                return Ok(Some(resource));
            }
        }

        Ok(Some(self.load_file(&path)?))
    }

    fn load_file(&self, path: &Path) -> Result<ResourceRef<T>> {
        let content = self.provider.content(path)?;
        let ctx = LoadContext {
            path,
            content: &content,
            manager: self.manager.upgrade(),
        };
        let resource = Resource::new(T::load(&ctx)?);

        // The binding may have changed while the loader ran
        let stale = {
            let mut index = self.index.write();
            match index.key_by_file(path) {
                Some(old_key) => {
                    let new_key = index.insert(resource.clone(), ResourceInfo::anonymous())?;
                    match index.replace(old_key, new_key) {
                        Ok(old) => {
                            index.set_revision(new_key, content.revision());
                            Some(old)
                        }
                        Err(err) => {
                            index.remove(new_key);
                            return Err(err);
                        }
                    }
                }
                None => {
                    index.insert(resource.clone(), ResourceInfo::filed(path, content.revision()))?;
                    None
                }
            }
        };

        match &stale {
            Some(old) => {
                if let Some(old_dependents) = old.dependencies_if_any() {
                    resource.dependencies().absorb(old_dependents);
                }
                push_unique(&self.dirty, &resource);
                engine_debug!("galaxy3d::ResourceCache", "[{}] {} reloaded: {} (revision {})",
                    self.label, T::KIND, path.display(), content.revision());
            }
            None => {
                engine_debug!("galaxy3d::ResourceCache", "[{}] {} loaded: {}",
                    self.label, T::KIND, path.display());
            }
        }

        self.adopt(&resource);
        self.link_dependencies(&resource, &[]);
        self.track_commit(&resource);
        self.monitor.structure_changed();
        Ok(resource)
    }

    /// Key of a resource owned by this cache
    pub fn key_of(&self, resource: &ResourceRef<T>) -> Option<ResourceKey> {
        self.index.read().key_of(resource)
    }

    pub fn contains(&self, resource: &ResourceRef<T>) -> bool {
        self.key_of(resource).is_some()
    }

    /// Current bindings of a resource owned by this cache
    pub fn info_of(&self, resource: &ResourceRef<T>) -> Option<ResourceInfo> {
        let index = self.index.read();
        let key = index.key_of(resource)?;
        index.info_of(key).cloned()
    }

    pub fn state_of(&self, resource: &ResourceRef<T>) -> Option<ComponentState> {
        self.info_of(resource).map(|info| info.state())
    }

    fn require_key(&self, resource: &ResourceRef<T>) -> Result<ResourceKey> {
        match self.key_of(resource) {
            Some(key) => Ok(key),
            None => engine_bail!(UnknownComponent => "galaxy3d::ResourceCache",
                "[{}] {} is not owned by this cache", self.label, T::KIND),
        }
    }

    // ===== BINDINGS =====

    /// Bind a name using the cache policy; an empty name clears it
    pub fn set_name(&self, resource: &ResourceRef<T>, name: &str) -> Result<()> {
        let policy = self.binding_policy();
        self.set_name_with(resource, name, policy)
    }

    pub fn set_name_with(&self, resource: &ResourceRef<T>, name: &str, policy: BindingPolicy) -> Result<()> {
        let key = self.require_key(resource)?;
        self.index.write().set_name_with(key, name, policy)?;
        self.monitor.structure_changed();
        Ok(())
    }

    /// Bind a file using the cache policy; an empty path clears it
    ///
    /// Non-empty paths are normalized to absolute form. The stored revision
    /// is reset, so the next `get_by_file` reloads unless the resource is
    /// saved there first.
    pub fn set_file(&self, resource: &ResourceRef<T>, file: &Path) -> Result<()> {
        let policy = self.binding_policy();
        self.set_file_with(resource, file, policy)
    }

    pub fn set_file_with(&self, resource: &ResourceRef<T>, file: &Path, policy: BindingPolicy) -> Result<()> {
        let key = self.require_key(resource)?;
        let path = if file.as_os_str().is_empty() { PathBuf::new() } else { normalize_path(file) };
        {
            let mut index = self.index.write();
            index.set_file_with(key, &path, policy)?;
            index.set_revision(key, 0);
        }
        self.monitor.structure_changed();
        Ok(())
    }

    // ===== REPLACE / REMOVE =====

    /// Replace `old` with a new resource built from `data`
    ///
    /// The new resource takes over the name, file and dependents of `old`
    /// and is marked dirty. `old` stays valid for its external holders but
    /// is no longer cached.
    pub fn replace(&self, old: &ResourceRef<T>, data: T) -> Result<ResourceRef<T>> {
        let resource = Resource::new(data);
        self.replace_with(old, &resource)?;
        Ok(resource)
    }

    /// Replace `old` with `new`; `new` may be unowned or already in this cache
    pub fn replace_with(&self, old: &ResourceRef<T>, new: &ResourceRef<T>) -> Result<()> {
        let old_key = self.require_key(old)?;
        {
            let mut index = self.index.write();
            let (new_key, inserted) = match index.key_of(new) {
                Some(key) => (key, false),
                None => (index.insert(new.clone(), ResourceInfo::anonymous())?, true),
            };
            if let Err(err) = index.replace(old_key, new_key) {
                if inserted {
                    index.remove(new_key);
                }
                return Err(err);
            }
        }

        if let Some(old_dependents) = old.dependencies_if_any() {
            new.dependencies().absorb(old_dependents);
        }
        self.adopt(new);
        self.link_dependencies(new, &[]);
        self.track_commit(new);
        push_unique(&self.dirty, new);
        self.monitor.structure_changed();
        engine_debug!("galaxy3d::ResourceCache", "[{}] {} replaced", self.label, T::KIND);
        Ok(())
    }

    /// Drop a resource from the cache. Returns false if it was not cached here.
    pub fn remove(&self, resource: &ResourceRef<T>) -> bool {
        let removed = {
            let mut index = self.index.write();
            match index.key_of(resource) {
                Some(key) => index.remove(key).is_some(),
                None => false,
            }
        };
        if removed {
            self.monitor.structure_changed();
        }
        removed
    }

    /// Drop every resource. Returns the number of removed entries.
    pub fn clear(&self) -> usize {
        let removed = self.index.write().clear();
        self.dirty.lock().clear();
        self.pending_commit.lock().clear();
        if !removed.is_empty() {
            self.monitor.structure_changed();
            engine_debug!("galaxy3d::ResourceCache", "[{}] Cleared {} resource(s)", self.label, removed.len());
        }
        removed.len()
    }

    /// Drop anonymous, unfiled resources nobody outside the cache holds
    ///
    /// Returns the number of removed entries.
    pub fn purge_unused(&self) -> usize {
        let removed = {
            let mut index = self.index.write();
            let unused: Vec<ResourceKey> = index
                .iter()
                .filter(|(_, resource, info)| {
                    info.state() == ComponentState::Unknown && Arc::strong_count(resource) == 1
                })
                .map(|(key, _, _)| key)
                .collect();
            for &key in &unused {
                index.remove(key);
            }
            unused.len()
        };
        if removed > 0 {
            self.monitor.structure_changed();
            engine_debug!("galaxy3d::ResourceCache", "[{}] Purged {} unused resource(s)", self.label, removed);
        }
        removed
    }

    // ===== EDITING / PROPAGATION =====

    /// Mutate a cached resource
    ///
    /// The resource is marked dirty and dependency edges are refreshed from
    /// its new `dependencies()`. Dependents are not notified until
    /// `notify_dependents` runs.
    pub fn edit<R>(&self, resource: &ResourceRef<T>, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        self.require_key(resource)?;
        let before = resource.read().dependencies();
        let result = f(&mut resource.write());
        self.link_dependencies(resource, &before);
        push_unique(&self.dirty, resource);
        self.track_commit(resource);
        self.monitor.data_changed();
        Ok(result)
    }

    /// Record an out-of-band change made through `Resource::write`
    pub fn mark_dirty(&self, resource: &ResourceRef<T>) -> Result<()> {
        self.require_key(resource)?;
        push_unique(&self.dirty, resource);
        self.track_commit(resource);
        self.monitor.data_changed();
        Ok(())
    }

    /// Number of resources waiting for `notify_dependents`
    pub fn dirty_count(&self) -> usize {
        self.dirty.lock().iter().filter(|w| w.strong_count() > 0).count()
    }

    /// Refresh every dependent of the resources marked dirty since the last call
    ///
    /// Each reachable dependent is refreshed exactly once, even when several
    /// dirty resources lead to it. Returns the number of refreshed dependents.
    pub fn notify_dependents(&self) -> usize {
        let sources: Vec<Arc<dyn DependencyNode>> = std::mem::take(&mut *self.dirty.lock())
            .into_iter()
            .filter_map(|weak| weak.upgrade())
            .map(|resource| as_node(&resource))
            .collect();
        if sources.is_empty() {
            return 0;
        }

        let notified = dependency::notify_dependents(&sources);
        if notified > 0 {
            self.monitor.data_changed();
        }
        engine_debug!("galaxy3d::ResourceCache", "[{}] {} change(s) reached {} dependent(s)",
            self.label, sources.len(), notified);
        notified
    }

    /// Run pending just-in-time work (device uploads, compilation)
    ///
    /// Cheap when nothing is pending. All pending resources are processed;
    /// the first failure is returned after the others ran.
    pub fn commit(&self) -> Result<usize> {
        let pending: Vec<ResourceRef<T>> = std::mem::take(&mut *self.pending_commit.lock())
            .into_iter()
            .filter_map(|weak| weak.upgrade())
            .collect();
        if pending.is_empty() {
            return Ok(0);
        }

        let mut committed = 0;
        let mut first_error = None;
        for resource in pending {
            let result = {
                let mut data = resource.write();
                if !data.needs_commit() {
                    continue;
                }
                data.commit()
            };
            match result {
                Ok(()) => committed += 1,
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        if committed > 0 {
            self.monitor.data_changed();
            engine_trace!("galaxy3d::ResourceCache", "[{}] Committed {} {}(s)", self.label, committed, T::KIND);
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(committed),
        }
    }

    /// Number of resources waiting for `commit`
    pub fn pending_commits(&self) -> usize {
        self.pending_commit.lock().iter().filter(|w| w.strong_count() > 0).count()
    }

    fn track_commit(&self, resource: &ResourceRef<T>) {
        if resource.read().needs_commit() {
            push_unique(&self.pending_commit, resource);
        }
    }

    /// Register `resource` as a dependent of everything it reads, and
    /// unregister it from entries of `previous` it no longer reads
    fn link_dependencies(&self, resource: &ResourceRef<T>, previous: &[Arc<dyn DependencyNode>]) {
        let current = resource.read().dependencies();
        dependency::relink(&as_node(resource), previous, &current);
    }

    /// Give a newly cached resource the manager its refresh hook resolves against
    fn adopt(&self, resource: &ResourceRef<T>) {
        resource.attach_manager(&self.manager);
    }

    // ===== ENUMERATION =====

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Snapshot of every entry, in insertion order
    pub fn info(&self) -> Vec<ResourceSummary> {
        self.index.read().info()
    }

    /// Cached resources, in insertion order
    pub fn resources(&self) -> Vec<ResourceRef<T>> {
        self.index.read().iter().map(|(_, resource, _)| resource.clone()).collect()
    }
}

impl<T: ResourceData + Reflect> ResourceCache<T> {
    /// Write a resource as a single-resource XML document and bind it to `file`
    ///
    /// The document goes through the cache's content provider, so the
    /// binding always names content this cache can read back. Nothing is
    /// rebound when the write fails. Returns the absolute path written.
    pub fn save_to_file(&self, resource: &ResourceRef<T>, file: &Path) -> Result<PathBuf> {
        let key = self.require_key(resource)?;
        let path = normalize_path(file);
        let name = self.info_of(resource).map(|info| info.name).unwrap_or_default();

        let text = property::to_document(&*resource.read(), &name).to_xml_string()?;
        let revision = self.provider.store(&path, text.as_bytes())?;
        {
            let mut index = self.index.write();
            let policy = index.policy();
            index.set_file_with(key, &path, policy)?;
            index.set_revision(key, revision);
        }
        self.monitor.structure_changed();
        engine_debug!("galaxy3d::ResourceCache", "[{}] {} saved: {}", self.label, T::KIND, path.display());
        Ok(path)
    }
}

#[cfg(test)]
#[path = "resource_cache_tests.rs"]
mod tests;
