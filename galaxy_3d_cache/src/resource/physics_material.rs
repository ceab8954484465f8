/// Physics material resource: surface response for the physics backend.
///
/// Stored as `<physicsmaterial static_friction=".." dynamic_friction=".."
/// restitution=".."/>`, or as `<m>` entries of a `<physicsmaterials>` block.

use crate::cache::{LoadContext, ResourceData};
use crate::component::property::{self, unknown_property, PropertyValue, Reflect};
use crate::error::Result;
use crate::xml::XmlNode;

#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsMaterial {
    static_friction: f32,
    dynamic_friction: f32,
    restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            static_friction: 0.5,
            dynamic_friction: 0.5,
            restitution: 0.0,
        }
    }
}

impl PhysicsMaterial {
    pub fn new(static_friction: f32, dynamic_friction: f32, restitution: f32) -> Self {
        Self {
            static_friction,
            dynamic_friction,
            restitution,
        }
    }

    pub fn static_friction(&self) -> f32 {
        self.static_friction
    }

    pub fn dynamic_friction(&self) -> f32 {
        self.dynamic_friction
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    pub fn set_static_friction(&mut self, value: f32) {
        self.static_friction = value;
    }

    pub fn set_dynamic_friction(&mut self, value: f32) {
        self.dynamic_friction = value;
    }

    pub fn set_restitution(&mut self, value: f32) {
        self.restitution = value;
    }
}

impl ResourceData for PhysicsMaterial {
    const KIND: &'static str = "PhysicsMaterial";

    fn load(ctx: &LoadContext<'_>) -> Result<Self> {
        let document = XmlNode::parse(ctx.content.as_text()?)?;
        let mut material = PhysicsMaterial::default();
        property::from_document(&mut material, &document)?;
        Ok(material)
    }
}

impl Reflect for PhysicsMaterial {
    const ROOT_TAG: &'static str = "physicsmaterial";

    fn properties(&self) -> Vec<(&'static str, PropertyValue)> {
        vec![
            ("static_friction", PropertyValue::Float(self.static_friction)),
            ("dynamic_friction", PropertyValue::Float(self.dynamic_friction)),
            ("restitution", PropertyValue::Float(self.restitution)),
        ]
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match (name, &value) {
            ("static_friction", PropertyValue::Float(v)) => self.static_friction = *v,
            ("dynamic_friction", PropertyValue::Float(v)) => self.dynamic_friction = *v,
            ("restitution", PropertyValue::Float(v)) => self.restitution = *v,
            _ => return unknown_property(Self::KIND, name, &value),
        }
        Ok(())
    }
}
