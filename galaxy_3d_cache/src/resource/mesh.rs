/// Mesh resource: index ranges drawn with named materials, plus an optional
/// collision shape.
///
/// ```xml
/// <mesh shape="crate.shape" bounds_min="-1 -1 -1" bounds_max="1 1 1">
///     <submesh name="body" material="Wood" first_index="0" index_count="36"/>
/// </mesh>
/// ```
///
/// Each resolved submesh material and the shape become dependency edges. A
/// refresh re-resolves the ones that were reloaded or replaced.

use std::sync::Arc;
use glam::Vec3;
use crate::cache::{as_node, DependencyNode, LoadContext, ResourceData, ResourceRef};
use crate::component::property::{self, unknown_property, PropertyValue, Reflect};
use crate::error::Result;
use crate::xml::XmlNode;
use crate::engine_warn;
use super::material::Material;
use super::resource_manager::ResourceManager;
use super::shape::Shape;

// ===== SUBMESH =====

/// A range of indices drawn with one material
#[derive(Clone)]
pub struct SubMesh {
    name: String,
    material_name: String,
    first_index: u32,
    index_count: u32,
    material: Option<ResourceRef<Material>>,
}

impl SubMesh {
    pub fn new(name: impl Into<String>, material_name: impl Into<String>, first_index: u32, index_count: u32) -> Self {
        Self {
            name: name.into(),
            material_name: material_name.into(),
            first_index,
            index_count,
            material: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn material_name(&self) -> &str {
        &self.material_name
    }

    pub fn first_index(&self) -> u32 {
        self.first_index
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn material(&self) -> Option<&ResourceRef<Material>> {
        self.material.as_ref()
    }

    fn to_node(&self) -> XmlNode {
        XmlNode::new("submesh")
            .with_attribute("name", &self.name)
            .with_attribute("material", &self.material_name)
            .with_attribute("first_index", self.first_index)
            .with_attribute("index_count", self.index_count)
    }

    fn from_node(node: &XmlNode) -> Result<Self> {
        Ok(Self::new(
            node.attribute("name").unwrap_or_default(),
            node.required_attribute("material")?,
            node.parse_attribute("first_index")?.unwrap_or(0),
            node.parse_attribute("index_count")?.unwrap_or(0),
        ))
    }
}

// ===== MESH =====

#[derive(Clone)]
pub struct Mesh {
    shape_name: String,
    bounds_min: Vec3,
    bounds_max: Vec3,
    submeshes: Vec<SubMesh>,
    shape: Option<ResourceRef<Shape>>,
    rebuilds: u64,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            shape_name: String::new(),
            bounds_min: Vec3::ZERO,
            bounds_max: Vec3::ZERO,
            submeshes: Vec::new(),
            shape: None,
            rebuilds: 0,
        }
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submeshes(&self) -> &[SubMesh] {
        &self.submeshes
    }

    pub fn submesh(&self, name: &str) -> Option<&SubMesh> {
        self.submeshes.iter().find(|s| s.name == name)
    }

    pub fn add_submesh(&mut self, submesh: SubMesh) {
        self.submeshes.push(submesh);
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.bounds_min, self.bounds_max)
    }

    pub fn set_bounds(&mut self, min: Vec3, max: Vec3) {
        self.bounds_min = min;
        self.bounds_max = max;
    }

    pub fn shape_name(&self) -> &str {
        &self.shape_name
    }

    pub fn shape(&self) -> Option<&ResourceRef<Shape>> {
        self.shape.as_ref()
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Bind a submesh material directly. Returns false if no submesh has that name.
    pub fn set_submesh_material(&mut self, submesh: &str, reference: &str, material: Option<ResourceRef<Material>>) -> bool {
        match self.submeshes.iter_mut().find(|s| s.name == submesh) {
            Some(entry) => {
                entry.material_name = reference.to_string();
                entry.material = material;
                true
            }
            None => false,
        }
    }

    /// Resolve submesh materials and the shape against `manager`
    pub fn resolve(&mut self, manager: &ResourceManager) -> Result<()> {
        for submesh in &mut self.submeshes {
            if submesh.material.is_none() {
                submesh.material = manager.find::<Material>(&submesh.material_name)?;
            }
        }
        if self.shape.is_none() {
            self.shape = manager.find::<Shape>(&self.shape_name)?;
        }
        Ok(())
    }

    /// Forget references evicted from their cache, then resolve again
    pub fn refresh(&mut self, manager: &ResourceManager) -> Result<()> {
        for submesh in &mut self.submeshes {
            if submesh.material.as_ref().is_some_and(|material| manager.is_evicted(material)) {
                submesh.material = None;
            }
        }
        if self.shape.as_ref().is_some_and(|shape| manager.is_evicted(shape)) {
            self.shape = None;
        }
        self.resolve(manager)
    }
}

impl ResourceData for Mesh {
    const KIND: &'static str = "Mesh";

    fn load(ctx: &LoadContext<'_>) -> Result<Self> {
        let document = XmlNode::parse(ctx.content.as_text()?)?;
        let mut mesh = Mesh::default();
        property::from_document(&mut mesh, &document)?;
        if let Some(manager) = &ctx.manager {
            mesh.resolve(manager)?;
        }
        Ok(mesh)
    }

    fn dependencies(&self) -> Vec<Arc<dyn DependencyNode>> {
        let mut dependencies: Vec<Arc<dyn DependencyNode>> = self
            .submeshes
            .iter()
            .filter_map(|s| s.material.as_ref().map(as_node))
            .collect();
        if let Some(shape) = &self.shape {
            dependencies.push(as_node(shape));
        }
        dependencies
    }

    fn on_dependency_changed(&mut self, manager: Option<&ResourceManager>) {
        self.rebuilds += 1;
        if let Some(manager) = manager {
            if let Err(err) = self.refresh(manager) {
                engine_warn!("galaxy3d::Mesh", "Refresh failed: {}", err);
            }
        }
    }
}

impl Reflect for Mesh {
    const ROOT_TAG: &'static str = "mesh";

    fn properties(&self) -> Vec<(&'static str, PropertyValue)> {
        vec![
            ("shape", PropertyValue::String(self.shape_name.clone())),
            ("bounds_min", PropertyValue::Vec3(self.bounds_min)),
            ("bounds_max", PropertyValue::Vec3(self.bounds_max)),
        ]
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match (name, &value) {
            ("shape", PropertyValue::String(v)) => {
                if *v != self.shape_name {
                    self.shape_name = v.clone();
                    self.shape = None;
                }
            }
            ("bounds_min", PropertyValue::Vec3(v)) => self.bounds_min = *v,
            ("bounds_max", PropertyValue::Vec3(v)) => self.bounds_max = *v,
            _ => return unknown_property(Self::KIND, name, &value),
        }
        Ok(())
    }

    fn write_children(&self, node: &mut XmlNode) {
        for submesh in &self.submeshes {
            node.push_child(submesh.to_node());
        }
    }

    fn read_children(&mut self, node: &XmlNode) -> Result<()> {
        self.submeshes = node
            .children_named("submesh")
            .map(SubMesh::from_node)
            .collect::<Result<Vec<_>>>()?;
        Ok(())
    }
}
