/// Component reflectors: one uniform protocol over every resource kind.
///
/// A reflector never owns a cache. Each call receives a `ParameterSet` and
/// reaches the cache for its kind through the set's resource manager slot,
/// so one reflector serves every manager in the process.
///
/// Components cross the protocol as type-erased `Component` handles; the
/// reflector for a kind downcasts them back to `ResourceRef<T>`.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use bitflags::bitflags;
use crate::cache::{BindingPolicy, ComponentState, ResourceCache, ResourceRef};
use crate::error::Result;
use crate::parameter::ParameterSet;
use crate::resource::{Effect, ManagedResource, Material, Mesh, PhysicsMaterial, ResourceManager, Shape, Texture};
use crate::{engine_bail, engine_debug};
use super::component_type::ComponentType;
use super::property::{self, PropertyValue, Reflect};

bitflags! {
    /// Static capabilities of a reflector
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ComponentFlags: u32 {
        /// New instances can be built from creation properties
        const CREATABLE = 1 << 0;
        /// New instances can be copied from a prototype
        const CLONEABLE = 1 << 1;
        const NAME_MUTABLE = 1 << 2;
        /// Instances can be rebound to a file and saved there
        const FILE_MUTABLE = 1 << 3;
        /// A new instance can take over an existing one's bindings
        const REPLACEABLE = 1 << 4;
    }
}

// ===== COMPONENT HANDLE =====

/// Type-erased handle to a cached resource
#[derive(Clone)]
pub struct Component {
    component_type: ComponentType,
    resource: Arc<dyn Any + Send + Sync>,
}

impl Component {
    pub fn new<T: ReflectedComponent>(resource: ResourceRef<T>) -> Self {
        Self {
            component_type: T::COMPONENT_TYPE,
            resource,
        }
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    /// The typed resource, if this handle holds a `T`
    pub fn downcast<T: ReflectedComponent>(&self) -> Option<ResourceRef<T>> {
        Arc::clone(&self.resource).downcast().ok()
    }

    /// Both handles refer to the same resource
    pub fn ptr_eq(&self, other: &Component) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.resource), Arc::as_ptr(&other.resource))
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({} @ {:p})", self.component_type, Arc::as_ptr(&self.resource))
    }
}

/// One loaded instance, as listed by `component_info`
#[derive(Debug, Clone)]
pub struct ComponentInfo {
    pub component: Component,
    pub name: String,
    pub file: PathBuf,
    pub revision: u64,
    pub state: ComponentState,
}

// ===== REFLECTOR PROTOCOL =====

pub trait ComponentReflector: Send + Sync {
    fn component_type(&self) -> ComponentType;

    fn flags(&self) -> ComponentFlags;

    /// Current state of one instance; `Unknown` when it has no owning cache
    fn component_state(&self, component: &Component, params: &ParameterSet) -> Result<ComponentState>;

    /// Every instance held by the cache of the parameter set's manager
    fn component_info(&self, params: &ParameterSet) -> Result<Vec<ComponentInfo>>;

    /// Build and cache a new instance
    ///
    /// # Arguments
    ///
    /// * `name` - Name to bind; empty leaves the instance anonymous
    /// * `creation` - Properties assigned after the prototype was copied
    /// * `params` - Call context, must hold the resource manager
    /// * `prototype` - Instance whose properties are copied first
    /// * `replace` - Instance whose name, file and dependents are taken over
    fn create_component(
        &self,
        name: &str,
        creation: &[(&str, PropertyValue)],
        params: &ParameterSet,
        prototype: Option<&Component>,
        replace: Option<&Component>,
    ) -> Result<Component>;

    fn component_by_name(&self, name: &str, params: &ParameterSet, throw_on_failure: bool) -> Result<Option<Component>>;

    /// Find or load the instance stored in `file`
    fn component_by_file(&self, file: &str, params: &ParameterSet, throw_on_failure: bool) -> Result<Option<Component>>;

    /// Rename an instance; `UnknownComponent` when it has no owning cache
    fn set_name(&self, component: &Component, name: &str, params: &ParameterSet) -> Result<()>;

    fn set_file(&self, component: &Component, file: &Path, params: &ParameterSet) -> Result<()>;

    /// Write an instance as a standalone document and bind it to `file`
    fn save_component(&self, component: &Component, file: &Path, params: &ParameterSet) -> Result<PathBuf>;

    /// Extension of standalone documents, without the dot
    fn file_extension(&self) -> &'static str {
        self.component_type().file_extension()
    }
}

// ===== TYPED SIDE =====

/// Resource kinds exposed through a `CacheReflector`
pub trait ReflectedComponent: ManagedResource {
    const COMPONENT_TYPE: ComponentType;
    const FLAGS: ComponentFlags;

    /// Build new data from creation properties and an optional prototype
    fn build(creation: &[(&str, PropertyValue)], prototype: Option<&Self>, manager: &ResourceManager) -> Result<Self>;

    /// Save `resource` to `file` through its cache
    fn save(cache: &ResourceCache<Self>, resource: &ResourceRef<Self>, file: &Path) -> Result<PathBuf>;
}

/// Reflector serving the cache of `T`
pub struct CacheReflector<T> {
    _kind: PhantomData<fn() -> T>,
}

impl<T: ReflectedComponent> CacheReflector<T> {
    pub fn new() -> Self {
        Self { _kind: PhantomData }
    }

    fn cache<'a>(&self, params: &'a ParameterSet) -> Result<&'a ResourceCache<T>> {
        params.resource_manager()?.cache::<T>()
    }

    fn resource(&self, component: &Component) -> Result<ResourceRef<T>> {
        match component.downcast::<T>() {
            Some(resource) => Ok(resource),
            None => engine_bail!(UnknownComponent => "galaxy3d::ComponentReflector",
                "{} reflector received a {} component", T::COMPONENT_TYPE, component.component_type()),
        }
    }

    fn require(&self, flag: ComponentFlags, operation: &str) -> Result<()> {
        if !T::FLAGS.contains(flag) {
            engine_bail!(InvalidParameter => "galaxy3d::ComponentReflector",
                "{} components do not support {}", T::COMPONENT_TYPE, operation);
        }
        Ok(())
    }
}

impl<T: ReflectedComponent> Default for CacheReflector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ReflectedComponent> ComponentReflector for CacheReflector<T> {
    fn component_type(&self) -> ComponentType {
        T::COMPONENT_TYPE
    }

    fn flags(&self) -> ComponentFlags {
        T::FLAGS
    }

    fn component_state(&self, component: &Component, params: &ParameterSet) -> Result<ComponentState> {
        let resource = self.resource(component)?;
        Ok(self.cache(params)?.state_of(&resource).unwrap_or(ComponentState::Unknown))
    }

    fn component_info(&self, params: &ParameterSet) -> Result<Vec<ComponentInfo>> {
        let cache = self.cache(params)?;
        Ok(cache
            .info()
            .into_iter()
            .filter_map(|summary| {
                let resource = cache.get(summary.key)?;
                Some(ComponentInfo {
                    component: Component::new(resource),
                    name: summary.name,
                    file: summary.file,
                    revision: summary.revision,
                    state: summary.state,
                })
            })
            .collect())
    }

    fn create_component(
        &self,
        name: &str,
        creation: &[(&str, PropertyValue)],
        params: &ParameterSet,
        prototype: Option<&Component>,
        replace: Option<&Component>,
    ) -> Result<Component> {
        match prototype {
            Some(_) => self.require(ComponentFlags::CLONEABLE, "cloning")?,
            None => self.require(ComponentFlags::CREATABLE, "creation")?,
        }
        if replace.is_some() {
            self.require(ComponentFlags::REPLACEABLE, "replacement")?;
        }

        let manager = params.resource_manager()?;
        let cache = manager.cache::<T>()?;
        let prototype = prototype.map(|p| self.resource(p)).transpose()?;
        let replace = replace.map(|r| self.resource(r)).transpose()?;

        // A rejected rename must fail before `replace` evicts the old resource
        if let Some(old) = &replace {
            if !name.is_empty() && cache.binding_policy() == BindingPolicy::Reject {
                if let Some(holder) = cache.get_by_name(name, false)? {
                    if !Arc::ptr_eq(&holder, old) {
                        engine_bail!(AlreadyExists => "galaxy3d::ComponentReflector",
                            "{} name '{}' is already bound", T::COMPONENT_TYPE, name);
                    }
                }
            }
        }

        let data = {
            let source = prototype.as_ref().map(|p| p.read());
            T::build(creation, source.as_deref(), manager)?
        };

        let resource = match &replace {
            Some(old) => {
                let resource = cache.replace(old, data)?;
                if !name.is_empty() {
                    cache.set_name(&resource, name)?;
                }
                resource
            }
            None => cache.create(data, name)?,
        };

        engine_debug!("galaxy3d::ComponentReflector", "{} '{}' created{}",
            T::COMPONENT_TYPE, name, if replace.is_some() { " in place" } else { "" });
        Ok(Component::new(resource))
    }

    fn component_by_name(&self, name: &str, params: &ParameterSet, throw_on_failure: bool) -> Result<Option<Component>> {
        Ok(self.cache(params)?.get_by_name(name, throw_on_failure)?.map(Component::new))
    }

    fn component_by_file(&self, file: &str, params: &ParameterSet, throw_on_failure: bool) -> Result<Option<Component>> {
        Ok(self.cache(params)?.get_by_file(file, throw_on_failure)?.map(Component::new))
    }

    fn set_name(&self, component: &Component, name: &str, params: &ParameterSet) -> Result<()> {
        self.require(ComponentFlags::NAME_MUTABLE, "renaming")?;
        let resource = self.resource(component)?;
        self.cache(params)?.set_name(&resource, name)
    }

    fn set_file(&self, component: &Component, file: &Path, params: &ParameterSet) -> Result<()> {
        self.require(ComponentFlags::FILE_MUTABLE, "file binding")?;
        let resource = self.resource(component)?;
        self.cache(params)?.set_file(&resource, file)
    }

    fn save_component(&self, component: &Component, file: &Path, params: &ParameterSet) -> Result<PathBuf> {
        self.require(ComponentFlags::FILE_MUTABLE, "saving")?;
        let resource = self.resource(component)?;
        T::save(self.cache(params)?, &resource, file)
    }
}

// ===== BUILT-IN KINDS =====

/// Kinds described entirely by reflected properties
macro_rules! document_component {
    ($ty:ty, $component_type:expr) => {
        impl ReflectedComponent for $ty {
            const COMPONENT_TYPE: ComponentType = $component_type;
            const FLAGS: ComponentFlags = ComponentFlags::all();

            fn build(creation: &[(&str, PropertyValue)], prototype: Option<&Self>, manager: &ResourceManager) -> Result<Self> {
                let mut data = <$ty>::default();
                if let Some(prototype) = prototype {
                    property::copy_properties(prototype, &mut data)?;
                }
                for (name, value) in creation {
                    data.set_property(name, value.clone())?;
                }
                data.resolve_references(manager)?;
                Ok(data)
            }

            fn save(cache: &ResourceCache<Self>, resource: &ResourceRef<Self>, file: &Path) -> Result<PathBuf> {
                cache.save_to_file(resource, file)
            }
        }
    };
}

/// Kinds backed by opaque bytes: clone-only, never saved as documents
macro_rules! binary_component {
    ($ty:ty, $component_type:expr, $bytes:ident) => {
        impl ReflectedComponent for $ty {
            const COMPONENT_TYPE: ComponentType = $component_type;
            const FLAGS: ComponentFlags = ComponentFlags::CLONEABLE
                .union(ComponentFlags::NAME_MUTABLE)
                .union(ComponentFlags::REPLACEABLE);

            fn build(creation: &[(&str, PropertyValue)], prototype: Option<&Self>, manager: &ResourceManager) -> Result<Self> {
                if let Some((name, _)) = creation.first() {
                    engine_bail!(InvalidParameter => "galaxy3d::ComponentReflector",
                        "{} has no property '{}'", $component_type, name);
                }
                let Some(prototype) = prototype else {
                    engine_bail!(InvalidParameter => "galaxy3d::ComponentReflector",
                        "{} instances are loaded from files or cloned", $component_type);
                };
                Ok(<$ty>::new(prototype.label(), prototype.$bytes(), Some(Arc::clone(manager.device()))))
            }

            fn save(_cache: &ResourceCache<Self>, _resource: &ResourceRef<Self>, file: &Path) -> Result<PathBuf> {
                engine_bail!(InvalidParameter => "galaxy3d::ComponentReflector",
                    "{} cannot be saved as a document ({})", $component_type, file.display())
            }
        }
    };
}

document_component!(PhysicsMaterial, ComponentType::PHYSICS_MATERIAL);
document_component!(Material, ComponentType::MATERIAL);
document_component!(Mesh, ComponentType::MESH);
binary_component!(Shape, ComponentType::SHAPE, payload);
binary_component!(Texture, ComponentType::TEXTURE, pixels);
binary_component!(Effect, ComponentType::EFFECT, source);

/// Reflectors for every built-in kind, in registration order
pub fn builtin_reflectors() -> Vec<Arc<dyn ComponentReflector>> {
    vec![
        Arc::new(CacheReflector::<PhysicsMaterial>::new()),
        Arc::new(CacheReflector::<Shape>::new()),
        Arc::new(CacheReflector::<Effect>::new()),
        Arc::new(CacheReflector::<Texture>::new()),
        Arc::new(CacheReflector::<Material>::new()),
        Arc::new(CacheReflector::<Mesh>::new()),
    ]
}

#[cfg(test)]
#[path = "reflector_tests.rs"]
mod tests;
