/// Built-in load jobs, one per aggregate block written by the collectors.

use std::marker::PhantomData;
use std::sync::Arc;
use crate::component::property::{self, Reflect};
use crate::error::Result;
use crate::parameter::ParameterSet;
use crate::resource::{Effect, Material, PhysicsMaterial, Texture};
use crate::xml::XmlNode;
use crate::{engine_bail, engine_debug, engine_warn};
use super::collectors::Collected;
use super::load_tasks::LoadJob;

/// Loads embedded entries: `<m name="..." prop="..."/>`
///
/// Each entry becomes a new named resource. An entry whose name is taken is
/// skipped when the session sets `NoOverwrite`, and fails otherwise.
pub struct DocumentLoader<T> {
    prerequisites: &'static [&'static str],
    _marker: PhantomData<fn() -> T>,
}

impl<T: Collected + Reflect + Default> DocumentLoader<T> {
    pub fn new() -> Self {
        Self::after(&[])
    }

    /// Loader running after the named jobs
    pub fn after(prerequisites: &'static [&'static str]) -> Self {
        Self {
            prerequisites,
            _marker: PhantomData,
        }
    }
}

impl<T: Collected + Reflect + Default> Default for DocumentLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Collected + Reflect + Default> LoadJob for DocumentLoader<T> {
    fn name(&self) -> &'static str {
        T::BLOCK_TAG
    }

    fn root_tag(&self) -> &'static str {
        T::BLOCK_TAG
    }

    fn prerequisites(&self) -> &'static [&'static str] {
        self.prerequisites
    }

    fn load(&self, node: &XmlNode, params: &ParameterSet) -> Result<usize> {
        let manager = params.resource_manager()?;
        let cache = manager.cache::<T>()?;
        let mut created = 0;

        for entry in node.children() {
            if entry.tag() != T::ENTRY_TAG {
                engine_warn!("galaxy3d::Serialize", "<{}>: ignoring <{}>", T::BLOCK_TAG, entry.tag());
                continue;
            }
            let name = entry.required_attribute("name")?;
            if cache.get_by_name(name, false)?.is_some() {
                if params.no_overwrite() {
                    engine_debug!("galaxy3d::Serialize", "Keeping existing {} '{}'", T::KIND, name);
                    continue;
                }
                engine_bail!(AlreadyExists => "galaxy3d::Serialize",
                    "{} '{}' already exists", T::KIND, name);
            }

            let mut data = T::default();
            property::read_properties(&mut data, entry)?;
            data.read_children(entry)?;
            data.resolve_references(manager)?;
            cache.create(data, name)?;
            created += 1;
        }
        Ok(created)
    }
}

/// Loads file references: `<t name="..." file="..."/>`
///
/// The file goes through the cache, so an already loaded file is shared.
/// The name is optional. A name already bound to the same file is a no-op;
/// bound to another resource, it is kept under `NoOverwrite` and fails
/// otherwise.
pub struct ReferenceLoader<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Collected> ReferenceLoader<T> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }
}

impl<T: Collected> Default for ReferenceLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Collected> LoadJob for ReferenceLoader<T> {
    fn name(&self) -> &'static str {
        T::BLOCK_TAG
    }

    fn root_tag(&self) -> &'static str {
        T::BLOCK_TAG
    }

    fn load(&self, node: &XmlNode, params: &ParameterSet) -> Result<usize> {
        let cache = params.resource_manager()?.cache::<T>()?;
        let mut loaded = 0;

        for entry in node.children() {
            if entry.tag() != T::ENTRY_TAG {
                engine_warn!("galaxy3d::Serialize", "<{}>: ignoring <{}>", T::BLOCK_TAG, entry.tag());
                continue;
            }
            let file = entry.required_attribute("file")?;
            let name = entry.attribute("name").unwrap_or_default();

            if !name.is_empty() {
                if let Some(existing) = cache.get_by_name(name, false)? {
                    let resolved = cache.resolver().resolve(file, false)?;
                    let same_file = !resolved.as_os_str().is_empty()
                        && cache.info_of(&existing).is_some_and(|info| info.file == resolved);
                    if same_file {
                        continue;
                    }
                    if params.no_overwrite() {
                        engine_debug!("galaxy3d::Serialize", "Keeping existing {} '{}'", T::KIND, name);
                        continue;
                    }
                    engine_bail!(AlreadyExists => "galaxy3d::Serialize",
                        "{} '{}' already exists", T::KIND, name);
                }
            }

            let before = cache.len();
            let Some(resource) = cache.get_by_file(file, true)? else {
                engine_bail!(NotFound => "galaxy3d::Serialize", "{} file '{}' not found", T::KIND, file);
            };
            if !name.is_empty() {
                cache.set_name(&resource, name)?;
            }
            loaded += cache.len().saturating_sub(before);
        }
        Ok(loaded)
    }
}

const MATERIAL_PREREQUISITES: &[&str] = &["textures", "effects"];

/// Load jobs for every built-in aggregate block, in registration order
pub fn builtin_load_jobs() -> Vec<Arc<dyn LoadJob>> {
    vec![
        Arc::new(DocumentLoader::<PhysicsMaterial>::new()),
        Arc::new(ReferenceLoader::<Texture>::new()),
        Arc::new(ReferenceLoader::<Effect>::new()),
        Arc::new(DocumentLoader::<Material>::after(MATERIAL_PREREQUISITES)),
    ]
}

#[cfg(test)]
#[path = "loaders_tests.rs"]
mod tests;
