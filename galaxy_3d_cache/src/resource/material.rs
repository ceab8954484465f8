/// Material resource: visual description of a surface.
///
/// A material names the effect that draws it and an optional diffuse
/// texture. References are stored by name (what the document holds) and
/// resolved against the owning resource manager; resolved references become
/// dependency edges, so editing an effect or texture refreshes the material.
/// When the effect or texture is reloaded or replaced, the refresh resolves
/// the reference again and picks up the new instance.

use std::sync::Arc;
use glam::Vec3;
use crate::cache::{as_node, DependencyNode, LoadContext, ResourceData, ResourceRef};
use crate::component::property::{self, unknown_property, PropertyValue, Reflect};
use crate::error::Result;
use crate::xml::XmlNode;
use crate::engine_warn;
use super::effect::Effect;
use super::resource_manager::ResourceManager;
use super::texture::Texture;

pub struct Material {
    /// Effect reference as written in documents
    effect_name: String,
    /// Diffuse texture reference as written in documents
    diffuse_texture_name: String,
    diffuse_color: Vec3,
    specular_power: f32,
    two_sided: bool,
    /// Resolved effect
    effect: Option<ResourceRef<Effect>>,
    /// Resolved diffuse texture
    diffuse_texture: Option<ResourceRef<Texture>>,
    /// Number of refreshes triggered by dependency changes
    rebuilds: u64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            effect_name: String::new(),
            diffuse_texture_name: String::new(),
            diffuse_color: Vec3::ONE,
            specular_power: 16.0,
            two_sided: false,
            effect: None,
            diffuse_texture: None,
            rebuilds: 0,
        }
    }
}

impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effect_name(&self) -> &str {
        &self.effect_name
    }

    pub fn diffuse_texture_name(&self) -> &str {
        &self.diffuse_texture_name
    }

    pub fn diffuse_color(&self) -> Vec3 {
        self.diffuse_color
    }

    pub fn specular_power(&self) -> f32 {
        self.specular_power
    }

    pub fn two_sided(&self) -> bool {
        self.two_sided
    }

    pub fn effect(&self) -> Option<&ResourceRef<Effect>> {
        self.effect.as_ref()
    }

    pub fn diffuse_texture(&self) -> Option<&ResourceRef<Texture>> {
        self.diffuse_texture.as_ref()
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn set_diffuse_color(&mut self, color: Vec3) {
        self.diffuse_color = color;
    }

    pub fn set_specular_power(&mut self, power: f32) {
        self.specular_power = power;
    }

    pub fn set_two_sided(&mut self, two_sided: bool) {
        self.two_sided = two_sided;
    }

    /// Bind the effect directly, with the reference written on save
    pub fn set_effect(&mut self, reference: impl Into<String>, effect: Option<ResourceRef<Effect>>) {
        self.effect_name = reference.into();
        self.effect = effect;
    }

    /// Bind the diffuse texture directly, with the reference written on save
    pub fn set_diffuse_texture(&mut self, reference: impl Into<String>, texture: Option<ResourceRef<Texture>>) {
        self.diffuse_texture_name = reference.into();
        self.diffuse_texture = texture;
    }

    /// Resolve the effect and texture references against `manager`
    pub fn resolve(&mut self, manager: &ResourceManager) -> Result<()> {
        if self.effect.is_none() {
            self.effect = manager.find::<Effect>(&self.effect_name)?;
        }
        if self.diffuse_texture.is_none() {
            self.diffuse_texture = manager.find::<Texture>(&self.diffuse_texture_name)?;
        }
        Ok(())
    }

    /// Forget references evicted from their cache, then resolve again
    pub fn refresh(&mut self, manager: &ResourceManager) -> Result<()> {
        if self.effect.as_ref().is_some_and(|effect| manager.is_evicted(effect)) {
            self.effect = None;
        }
        if self.diffuse_texture.as_ref().is_some_and(|texture| manager.is_evicted(texture)) {
            self.diffuse_texture = None;
        }
        self.resolve(manager)
    }
}

impl ResourceData for Material {
    const KIND: &'static str = "Material";

    fn load(ctx: &LoadContext<'_>) -> Result<Self> {
        let document = XmlNode::parse(ctx.content.as_text()?)?;
        let mut material = Material::default();
        property::from_document(&mut material, &document)?;
        if let Some(manager) = &ctx.manager {
            material.resolve(manager)?;
        }
        Ok(material)
    }

    fn dependencies(&self) -> Vec<Arc<dyn DependencyNode>> {
        let mut dependencies = Vec::new();
        if let Some(effect) = &self.effect {
            dependencies.push(as_node(effect));
        }
        if let Some(texture) = &self.diffuse_texture {
            dependencies.push(as_node(texture));
        }
        dependencies
    }

    fn on_dependency_changed(&mut self, manager: Option<&ResourceManager>) {
        self.rebuilds += 1;
        if let Some(manager) = manager {
            if let Err(err) = self.refresh(manager) {
                engine_warn!("galaxy3d::Material", "Refresh failed: {}", err);
            }
        }
    }
}

impl Reflect for Material {
    const ROOT_TAG: &'static str = "material";

    fn properties(&self) -> Vec<(&'static str, PropertyValue)> {
        vec![
            ("effect", PropertyValue::String(self.effect_name.clone())),
            ("diffuse_texture", PropertyValue::String(self.diffuse_texture_name.clone())),
            ("diffuse_color", PropertyValue::Vec3(self.diffuse_color)),
            ("specular_power", PropertyValue::Float(self.specular_power)),
            ("two_sided", PropertyValue::Bool(self.two_sided)),
        ]
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match (name, &value) {
            ("effect", PropertyValue::String(v)) => {
                if *v != self.effect_name {
                    self.effect_name = v.clone();
                    self.effect = None;
                }
            }
            ("diffuse_texture", PropertyValue::String(v)) => {
                if *v != self.diffuse_texture_name {
                    self.diffuse_texture_name = v.clone();
                    self.diffuse_texture = None;
                }
            }
            ("diffuse_color", PropertyValue::Vec3(v)) => self.diffuse_color = *v,
            ("specular_power", PropertyValue::Float(v)) => self.specular_power = *v,
            ("two_sided", PropertyValue::Bool(v)) => self.two_sided = *v,
            _ => return unknown_property(Self::KIND, name, &value),
        }
        Ok(())
    }
}
