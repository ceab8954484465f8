/// Save jobs gathering the resources a document references.
///
/// Each collector writes one aggregate block:
///
/// ```xml
/// <physicsmaterials><m name="Red" static_friction="0.9" .../></physicsmaterials>
/// <materials><m name="wood" effect="lit" .../></materials>
/// <textures><t name="wood_tex" file="/data/wood.dds"/></textures>
/// <effects><e name="lit" file="/data/lit.fx"/></effects>
/// ```
///
/// Property-described kinds are embedded and must be named; byte-backed
/// kinds are written as file references and must be filed.

use std::sync::Arc;
use indexmap::IndexMap;
use crate::cache::{ResourceInfo, ResourceRef};
use crate::component::property;
use crate::error::Result;
use crate::parameter::ParameterSet;
use crate::resource::{Effect, ManagedResource, Material, PhysicsMaterial, Texture};
use crate::xml::XmlNode;
use crate::{engine_trace, engine_warn};
use super::save_queue::{find_or_create, SaveJob, SingletonJob};

/// Resource kinds with an aggregate save block
pub trait Collected: ManagedResource {
    /// Parameter slot of the kind's collector
    const SLOT: &'static str;
    /// Aggregate element, also the root tag of the matching load job
    const BLOCK_TAG: &'static str;
    const ENTRY_TAG: &'static str;

    /// The entry for one resource, `None` when it cannot be written
    fn entry(resource: &ResourceRef<Self>, info: &ResourceInfo) -> Option<XmlNode>;

    /// Hand the resources this one references to their collectors
    fn collect_references(_resource: &ResourceRef<Self>, _params: &mut ParameterSet) -> Result<()> {
        Ok(())
    }
}

/// Singleton save job writing the `BLOCK_TAG` block of `T`
pub struct Collector<T> {
    /// Collected resources by address, kept alive for the session
    items: IndexMap<usize, ResourceRef<T>>,
    /// Number of items already written
    written: usize,
}

impl<T> Default for Collector<T> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
            written: 0,
        }
    }
}

impl<T: Collected> Collector<T> {
    /// Add a resource. Returns false if it was already collected.
    pub fn add(&mut self, resource: &ResourceRef<T>) -> bool {
        let address = Arc::as_ptr(resource) as usize;
        if self.items.contains_key(&address) {
            return false;
        }
        self.items.insert(address, resource.clone());
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Collected> SaveJob for Collector<T> {
    fn kind(&self) -> &'static str {
        T::BLOCK_TAG
    }

    fn save(&mut self, root: &mut XmlNode, params: &mut ParameterSet) -> Result<()> {
        if self.written == self.items.len() {
            return Ok(());
        }
        let fresh: Vec<ResourceRef<T>> = self.items.values().skip(self.written).cloned().collect();
        self.written = self.items.len();

        let cache = params.resource_manager()?.cache::<T>()?;
        let mut entries = Vec::with_capacity(fresh.len());
        for resource in &fresh {
            let Some(info) = cache.info_of(resource) else {
                engine_warn!("galaxy3d::Serialize", "Skipping {} not owned by the session's manager", T::KIND);
                continue;
            };
            match T::entry(resource, &info) {
                Some(entry) => entries.push(entry),
                None => engine_warn!("galaxy3d::Serialize",
                    "Skipping {} '{}' ({}): nothing to reference it by", T::KIND, info.name, info.file.display()),
            }
        }

        let count = entries.len();
        if count > 0 {
            let block = root.child_or_insert(T::BLOCK_TAG);
            for entry in entries {
                block.push_child(entry);
            }
        }
        engine_trace!("galaxy3d::Serialize", "<{}>: wrote {} entr(ies)", T::BLOCK_TAG, count);

        for resource in &fresh {
            T::collect_references(resource, params)?;
        }
        Ok(())
    }
}

impl<T: Collected> SingletonJob for Collector<T> {
    const SLOT: &'static str = T::SLOT;
}

/// Hand `resource` to the session's collector for its kind
///
/// Returns false if the collector already had it.
pub fn collect<T: Collected>(params: &mut ParameterSet, resource: &ResourceRef<T>) -> Result<bool> {
    let collector = find_or_create::<Collector<T>>(params)?;
    let added = collector.lock().add(resource);
    Ok(added)
}

/// Hand every writable resource of the manager's `T` cache to its collector
///
/// Returns the number of newly collected resources.
pub fn collect_all<T: Collected>(params: &mut ParameterSet) -> Result<usize> {
    let resources: Vec<ResourceRef<T>> = {
        let cache = params.resource_manager()?.cache::<T>()?;
        cache
            .resources()
            .into_iter()
            .filter(|resource| {
                cache
                    .info_of(resource)
                    .is_some_and(|info| T::entry(resource, &info).is_some())
            })
            .collect()
    };
    let mut added = 0;
    for resource in &resources {
        if collect(params, resource)? {
            added += 1;
        }
    }
    Ok(added)
}

// ===== BUILT-IN KINDS =====

fn embedded<T: property::Reflect>(tag: &str, resource: &ResourceRef<T>, info: &ResourceInfo) -> Option<XmlNode> {
    if info.name.is_empty() {
        return None;
    }
    let mut node = XmlNode::new(tag).with_attribute("name", &info.name);
    let data = resource.read();
    property::write_properties(&*data, &mut node);
    data.write_children(&mut node);
    Some(node)
}

fn file_reference(tag: &str, info: &ResourceInfo) -> Option<XmlNode> {
    if info.file.as_os_str().is_empty() {
        return None;
    }
    let mut node = XmlNode::new(tag);
    if !info.name.is_empty() {
        node.set_attribute("name", &info.name);
    }
    node.set_attribute("file", info.file.display());
    Some(node)
}

impl Collected for PhysicsMaterial {
    const SLOT: &'static str = "SaveJob::PhysicsMaterials";
    const BLOCK_TAG: &'static str = "physicsmaterials";
    const ENTRY_TAG: &'static str = "m";

    fn entry(resource: &ResourceRef<Self>, info: &ResourceInfo) -> Option<XmlNode> {
        embedded(Self::ENTRY_TAG, resource, info)
    }
}

impl Collected for Material {
    const SLOT: &'static str = "SaveJob::Materials";
    const BLOCK_TAG: &'static str = "materials";
    const ENTRY_TAG: &'static str = "m";

    fn entry(resource: &ResourceRef<Self>, info: &ResourceInfo) -> Option<XmlNode> {
        embedded(Self::ENTRY_TAG, resource, info)
    }

    fn collect_references(resource: &ResourceRef<Self>, params: &mut ParameterSet) -> Result<()> {
        let (effect, texture) = {
            let data = resource.read();
            (data.effect().cloned(), data.diffuse_texture().cloned())
        };
        if let Some(texture) = texture {
            collect(params, &texture)?;
        }
        if let Some(effect) = effect {
            collect(params, &effect)?;
        }
        Ok(())
    }
}

impl Collected for Texture {
    const SLOT: &'static str = "SaveJob::Textures";
    const BLOCK_TAG: &'static str = "textures";
    const ENTRY_TAG: &'static str = "t";

    fn entry(_resource: &ResourceRef<Self>, info: &ResourceInfo) -> Option<XmlNode> {
        file_reference(Self::ENTRY_TAG, info)
    }
}

impl Collected for Effect {
    const SLOT: &'static str = "SaveJob::Effects";
    const BLOCK_TAG: &'static str = "effects";
    const ENTRY_TAG: &'static str = "e";

    fn entry(_resource: &ResourceRef<Self>, info: &ResourceInfo) -> Option<XmlNode> {
        file_reference(Self::ENTRY_TAG, info)
    }
}

#[cfg(test)]
#[path = "collectors_tests.rs"]
mod tests;
