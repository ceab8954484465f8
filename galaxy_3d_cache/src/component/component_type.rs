/// Component type tags.
///
/// A `ComponentType` names one reflectable kind and the file extension its
/// standalone documents use. Tags are plain constants compared by value.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentType {
    name: &'static str,
    file_extension: &'static str,
}

impl ComponentType {
    pub const PHYSICS_MATERIAL: ComponentType = ComponentType::new("PhysicsMaterial", "physicsmaterial");
    pub const MATERIAL: ComponentType = ComponentType::new("Material", "material");
    pub const MESH: ComponentType = ComponentType::new("Mesh", "mesh");
    pub const SHAPE: ComponentType = ComponentType::new("Shape", "shape");
    pub const TEXTURE: ComponentType = ComponentType::new("Texture", "dds");
    pub const EFFECT: ComponentType = ComponentType::new("Effect", "fx");

    /// Built-in tags in registration order
    pub const BUILTIN: [ComponentType; 6] = [
        Self::PHYSICS_MATERIAL,
        Self::SHAPE,
        Self::EFFECT,
        Self::TEXTURE,
        Self::MATERIAL,
        Self::MESH,
    ];

    pub const fn new(name: &'static str, file_extension: &'static str) -> Self {
        Self { name, file_extension }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Extension without the leading dot
    pub fn file_extension(&self) -> &'static str {
        self.file_extension
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
