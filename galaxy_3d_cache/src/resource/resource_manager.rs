/// Central resource manager: the set of caches one subsystem needs.
///
/// A physics manager holds the physics material and shape caches; a scene
/// manager holds the effect, texture, material and mesh caches. All caches of
/// a manager share one `ComponentMonitor`, one content provider and clones of
/// one path resolver. Loaders reach sibling caches and the device through the
/// weak back-link each cache keeps to its manager.

use std::sync::{Arc, Weak};
use bitflags::bitflags;
use crate::cache::{BindingPolicy, CacheDesc, ComponentMonitor, ResourceCache, ResourceData, ResourceRef};
use crate::content::{ContentProvider, FileContentProvider};
use crate::device::{Device, NullDevice};
use crate::error::Result;
use crate::path::{AbsolutePathResolver, PathResolver};
use crate::{engine_debug, engine_err, engine_warn};
use super::effect::Effect;
use super::material::Material;
use super::mesh::Mesh;
use super::physics_material::PhysicsMaterial;
use super::shape::Shape;
use super::texture::Texture;

bitflags! {
    /// Caches held by a manager
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CacheKinds: u32 {
        const PHYSICS_MATERIALS = 1 << 0;
        const SHAPES = 1 << 1;
        const EFFECTS = 1 << 2;
        const TEXTURES = 1 << 3;
        const MATERIALS = 1 << 4;
        const MESHES = 1 << 5;

        const PHYSICS = Self::PHYSICS_MATERIALS.bits() | Self::SHAPES.bits();
        const SCENE = Self::EFFECTS.bits() | Self::TEXTURES.bits()
            | Self::MATERIALS.bits() | Self::MESHES.bits();
    }
}

// ===== DESCRIPTOR =====

/// Manager configuration
pub struct ResourceManagerDesc {
    /// Device receiving uploads
    pub device: Arc<dyn Device>,
    /// Resolver cloned into every cache
    pub resolver: Box<dyn PathResolver>,
    /// Content source shared by every cache
    pub provider: Arc<dyn ContentProvider>,
    /// Collision handling for `set_name`/`set_file`
    pub binding_policy: BindingPolicy,
    /// Caches to create
    pub kinds: CacheKinds,
}

impl Default for ResourceManagerDesc {
    fn default() -> Self {
        Self {
            device: Arc::new(NullDevice::new()),
            resolver: Box::new(AbsolutePathResolver::new()),
            provider: Arc::new(FileContentProvider::new()),
            binding_policy: BindingPolicy::Evict,
            kinds: CacheKinds::all(),
        }
    }
}

// ===== TYPED ACCESS =====

/// Resource types a manager can hold
pub trait ManagedResource: ResourceData {
    /// The manager's cache for this type, if it has one
    fn cache_in(manager: &ResourceManager) -> Option<&ResourceCache<Self>>;

    /// Resolve named references to other resources (materials to effects,
    /// meshes to materials...). Unresolvable references are left empty.
    fn resolve_references(&mut self, _manager: &ResourceManager) -> Result<()> {
        Ok(())
    }
}

macro_rules! managed_resource {
    ($ty:ty, $field:ident) => {
        impl ManagedResource for $ty {
            fn cache_in(manager: &ResourceManager) -> Option<&ResourceCache<Self>> {
                manager.$field.as_ref()
            }
        }
    };
    ($ty:ty, $field:ident, resolve) => {
        impl ManagedResource for $ty {
            fn cache_in(manager: &ResourceManager) -> Option<&ResourceCache<Self>> {
                manager.$field.as_ref()
            }

            fn resolve_references(&mut self, manager: &ResourceManager) -> Result<()> {
                self.resolve(manager)
            }
        }
    };
}

// ===== MANAGER =====

pub struct ResourceManager {
    // Caches are declared before the device so their resources release
    // device objects before the device itself goes away
    physics_materials: Option<ResourceCache<PhysicsMaterial>>,
    shapes: Option<ResourceCache<Shape>>,
    effects: Option<ResourceCache<Effect>>,
    textures: Option<ResourceCache<Texture>>,
    materials: Option<ResourceCache<Material>>,
    meshes: Option<ResourceCache<Mesh>>,
    kinds: CacheKinds,
    monitor: Arc<ComponentMonitor>,
    device: Arc<dyn Device>,
}

fn make_cache<T: ResourceData>(
    enabled: bool,
    label: &str,
    desc: &ResourceManagerDesc,
    monitor: &Arc<ComponentMonitor>,
    manager: &Weak<ResourceManager>,
) -> Option<ResourceCache<T>> {
    enabled.then(|| {
        ResourceCache::new(
            CacheDesc {
                label: label.to_string(),
                binding_policy: desc.binding_policy,
            },
            desc.resolver.clone(),
            Arc::clone(&desc.provider),
            Arc::clone(monitor),
        )
        .with_manager(manager.clone())
    })
}

impl ResourceManager {
    /// Create a manager with the caches listed in `desc.kinds`
    pub fn new(desc: ResourceManagerDesc) -> Arc<Self> {
        let monitor = Arc::new(ComponentMonitor::new());
        let kinds = desc.kinds;
        let manager = Arc::new_cyclic(|weak| Self {
            physics_materials: make_cache(kinds.contains(CacheKinds::PHYSICS_MATERIALS),
                "PhysicsMaterialCache", &desc, &monitor, weak),
            shapes: make_cache(kinds.contains(CacheKinds::SHAPES), "ShapeCache", &desc, &monitor, weak),
            effects: make_cache(kinds.contains(CacheKinds::EFFECTS), "EffectCache", &desc, &monitor, weak),
            textures: make_cache(kinds.contains(CacheKinds::TEXTURES), "TextureCache", &desc, &monitor, weak),
            materials: make_cache(kinds.contains(CacheKinds::MATERIALS), "MaterialCache", &desc, &monitor, weak),
            meshes: make_cache(kinds.contains(CacheKinds::MESHES), "MeshCache", &desc, &monitor, weak),
            kinds,
            monitor: Arc::clone(&monitor),
            device: Arc::clone(&desc.device),
        });
        engine_debug!("galaxy3d::ResourceManager", "Resource manager created ({:?}, device: {})",
            kinds, manager.device.name());
        manager
    }

    /// Physics subsystem manager: physics material and shape caches
    pub fn physics(desc: ResourceManagerDesc) -> Arc<Self> {
        Self::new(ResourceManagerDesc { kinds: CacheKinds::PHYSICS, ..desc })
    }

    /// Scene subsystem manager: effect, texture, material and mesh caches
    pub fn scene(desc: ResourceManagerDesc) -> Arc<Self> {
        Self::new(ResourceManagerDesc { kinds: CacheKinds::SCENE, ..desc })
    }

    pub fn device(&self) -> &Arc<dyn Device> {
        &self.device
    }

    pub fn monitor(&self) -> &Arc<ComponentMonitor> {
        &self.monitor
    }

    pub fn kinds(&self) -> CacheKinds {
        self.kinds
    }

    /// The cache for `T`
    ///
    /// Fails with `UnknownComponent` when this manager does not hold one.
    pub fn cache<T: ManagedResource>(&self) -> Result<&ResourceCache<T>> {
        T::cache_in(self).ok_or_else(|| {
            engine_err!(UnknownComponent => "galaxy3d::ResourceManager",
                "This resource manager has no {} cache ({:?})", T::KIND, self.kinds)
        })
    }

    pub fn physics_materials(&self) -> Result<&ResourceCache<PhysicsMaterial>> {
        self.cache()
    }

    pub fn shapes(&self) -> Result<&ResourceCache<Shape>> {
        self.cache()
    }

    pub fn effects(&self) -> Result<&ResourceCache<Effect>> {
        self.cache()
    }

    pub fn textures(&self) -> Result<&ResourceCache<Texture>> {
        self.cache()
    }

    pub fn materials(&self) -> Result<&ResourceCache<Material>> {
        self.cache()
    }

    pub fn meshes(&self) -> Result<&ResourceCache<Mesh>> {
        self.cache()
    }

    /// Look up a referenced resource by name, then by file
    ///
    /// Returns `None` when the reference is empty, when this manager has no
    /// cache for `T`, or when nothing matches. Load and parse errors of the
    /// referenced file are returned.
    pub fn find<T: ManagedResource>(&self, reference: &str) -> Result<Option<ResourceRef<T>>> {
        if reference.is_empty() {
            return Ok(None);
        }
        let Some(cache) = T::cache_in(self) else {
            return Ok(None);
        };
        if let Some(found) = cache.get_by_name(reference, false)? {
            return Ok(Some(found));
        }
        let found = cache.get_by_file(reference, false)?;
        if found.is_none() {
            engine_warn!("galaxy3d::ResourceManager", "Unresolved {} reference '{}'", T::KIND, reference);
        }
        Ok(found)
    }

    /// Whether `resource` was cached here and has since been dropped from
    /// its cache (reloaded, replaced or removed)
    ///
    /// Resources owned by another manager's cache, or never cached, are not
    /// evicted.
    pub fn is_evicted<T: ManagedResource>(&self, resource: &ResourceRef<T>) -> bool {
        match (T::cache_in(self), resource.owner()) {
            (Some(cache), Some(owner)) => owner.cache == cache.id() && !cache.contains(resource),
            _ => false,
        }
    }

    /// Commit every cache, leaves first (device data before its users)
    ///
    /// Returns the number of committed resources; the first failure is
    /// returned after every cache ran.
    pub fn commit(&self) -> Result<usize> {
        let results = [
            self.textures.as_ref().map(ResourceCache::commit),
            self.effects.as_ref().map(ResourceCache::commit),
            self.shapes.as_ref().map(ResourceCache::commit),
            self.physics_materials.as_ref().map(ResourceCache::commit),
            self.materials.as_ref().map(ResourceCache::commit),
            self.meshes.as_ref().map(ResourceCache::commit),
        ];
        let mut committed = 0;
        let mut first_error = None;
        for result in results.into_iter().flatten() {
            match result {
                Ok(count) => committed += count,
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(committed),
        }
    }

    /// Propagate pending changes of every cache, leaves first
    pub fn notify_dependents(&self) -> usize {
        [
            self.textures.as_ref().map(ResourceCache::notify_dependents),
            self.effects.as_ref().map(ResourceCache::notify_dependents),
            self.shapes.as_ref().map(ResourceCache::notify_dependents),
            self.physics_materials.as_ref().map(ResourceCache::notify_dependents),
            self.materials.as_ref().map(ResourceCache::notify_dependents),
            self.meshes.as_ref().map(ResourceCache::notify_dependents),
        ]
        .into_iter()
        .flatten()
        .sum()
    }

    /// Empty every cache, users first
    pub fn clear(&self) -> usize {
        [
            self.meshes.as_ref().map(ResourceCache::clear),
            self.materials.as_ref().map(ResourceCache::clear),
            self.physics_materials.as_ref().map(ResourceCache::clear),
            self.shapes.as_ref().map(ResourceCache::clear),
            self.effects.as_ref().map(ResourceCache::clear),
            self.textures.as_ref().map(ResourceCache::clear),
        ]
        .into_iter()
        .flatten()
        .sum()
    }

    /// Purge unused anonymous resources of every cache, users first
    pub fn purge_unused(&self) -> usize {
        [
            self.meshes.as_ref().map(ResourceCache::purge_unused),
            self.materials.as_ref().map(ResourceCache::purge_unused),
            self.physics_materials.as_ref().map(ResourceCache::purge_unused),
            self.shapes.as_ref().map(ResourceCache::purge_unused),
            self.effects.as_ref().map(ResourceCache::purge_unused),
            self.textures.as_ref().map(ResourceCache::purge_unused),
        ]
        .into_iter()
        .flatten()
        .sum()
    }

    /// Total number of cached resources
    pub fn resource_count(&self) -> usize {
        [
            self.physics_materials.as_ref().map(ResourceCache::len),
            self.shapes.as_ref().map(ResourceCache::len),
            self.effects.as_ref().map(ResourceCache::len),
            self.textures.as_ref().map(ResourceCache::len),
            self.materials.as_ref().map(ResourceCache::len),
            self.meshes.as_ref().map(ResourceCache::len),
        ]
        .into_iter()
        .flatten()
        .sum()
    }
}

managed_resource!(PhysicsMaterial, physics_materials);
managed_resource!(Shape, shapes);
managed_resource!(Effect, effects);
managed_resource!(Texture, textures);
managed_resource!(Material, materials, resolve);
managed_resource!(Mesh, meshes, resolve);

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
