//! Resource kinds and the resource manager
//!
//! Each kind implements `ResourceData` (loading, dependencies, commit) and,
//! for XML-backed kinds, `Reflect`. The `ResourceManager` bundles the caches
//! a subsystem needs.

mod resource_manager;
pub mod effect;
pub mod material;
pub mod mesh;
pub mod physics_material;
pub mod shape;
pub mod texture;

pub use resource_manager::{CacheKinds, ManagedResource, ResourceManager, ResourceManagerDesc};
pub use effect::Effect;
pub use material::Material;
pub use mesh::{Mesh, SubMesh};
pub use physics_material::PhysicsMaterial;
pub use shape::Shape;
pub use texture::Texture;

#[cfg(test)]
#[path = "resource_kinds_tests.rs"]
mod tests;
