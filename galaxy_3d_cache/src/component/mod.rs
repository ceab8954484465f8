//! Component reflection
//!
//! Type tags, reflected properties, the reflector protocol and the registry
//! that maps type names to reflectors.

pub mod component_registry;
pub mod component_type;
pub mod property;
pub mod reflector;

pub use component_registry::ComponentRegistry;
pub use component_type::ComponentType;
pub use property::{PropertyValue, Reflect};
pub use reflector::{
    builtin_reflectors, CacheReflector, Component, ComponentFlags, ComponentInfo,
    ComponentReflector, ReflectedComponent,
};
