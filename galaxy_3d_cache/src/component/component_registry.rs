/// Registry of component reflectors, keyed by component type name.
///
/// Built once by `Engine::initialize()`; tools may register additional
/// reflectors afterwards. Registration order is preserved for listings.

use std::sync::Arc;
use indexmap::IndexMap;
use parking_lot::RwLock;
use crate::error::Result;
use crate::{engine_bail, engine_debug};
use super::component_type::ComponentType;
use super::reflector::{builtin_reflectors, Component, ComponentReflector};

#[derive(Default)]
pub struct ComponentRegistry {
    reflectors: RwLock<IndexMap<&'static str, Arc<dyn ComponentReflector>>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the reflectors of every built-in kind
    pub fn with_builtin() -> Result<Self> {
        let registry = Self::new();
        for reflector in builtin_reflectors() {
            registry.register(reflector)?;
        }
        Ok(registry)
    }

    /// Register a reflector under its component type name
    ///
    /// # Errors
    ///
    /// `AlreadyExists` when the type name is already registered.
    pub fn register(&self, reflector: Arc<dyn ComponentReflector>) -> Result<()> {
        let component_type = reflector.component_type();
        let mut reflectors = self.reflectors.write();
        if reflectors.contains_key(component_type.name()) {
            engine_bail!(AlreadyExists => "galaxy3d::ComponentRegistry",
                "Component type '{}' is already registered", component_type);
        }
        reflectors.insert(component_type.name(), reflector);
        engine_debug!("galaxy3d::ComponentRegistry", "Registered component type '{}' (.{})",
            component_type, component_type.file_extension());
        Ok(())
    }

    pub fn reflector(&self, type_name: &str) -> Option<Arc<dyn ComponentReflector>> {
        self.reflectors.read().get(type_name).cloned()
    }

    /// Reflector for a type tag; the tag must match the registered one exactly
    pub fn reflector_for(&self, component_type: &ComponentType) -> Option<Arc<dyn ComponentReflector>> {
        self.reflector(component_type.name())
            .filter(|reflector| reflector.component_type() == *component_type)
    }

    /// Reflector able to handle `component`
    pub fn reflector_of(&self, component: &Component) -> Option<Arc<dyn ComponentReflector>> {
        self.reflector_for(&component.component_type())
    }

    /// Every reflector, in registration order
    pub fn reflectors(&self) -> Vec<Arc<dyn ComponentReflector>> {
        self.reflectors.read().values().cloned().collect()
    }

    pub fn component_types(&self) -> Vec<ComponentType> {
        self.reflectors.read().values().map(|r| r.component_type()).collect()
    }

    pub fn len(&self) -> usize {
        self.reflectors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reflectors.read().is_empty()
    }
}

#[cfg(test)]
#[path = "component_registry_tests.rs"]
mod tests;
