/// ParameterSet - per-call table of typed context values.
///
/// Slots are addressed by `ParamId` from the global `ParameterLayout`. A set
/// is created by the caller of a load, save or reflection call and passed
/// down by reference; it carries the device, the resource manager, scene
/// handles and job state.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;
use crate::error::Result;
use crate::resource::ResourceManager;
use crate::engine_bail;
use super::parameter_layout::{builtin, ParamId, ParameterLayout};

type Slot = Option<Box<dyn Any + Send + Sync>>;

#[derive(Default)]
pub struct ParameterSet {
    values: Vec<Slot>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, returning the previous occupant of the slot
    pub fn set<T: Any + Send + Sync>(&mut self, id: ParamId, value: T) -> Option<Box<dyn Any + Send + Sync>> {
        let index = id.index();
        if self.values.len() <= index {
            self.values.resize_with(index + 1, || None);
        }
        self.values[index].replace(Box::new(value))
    }

    /// Store a value in the slot registered under `name`
    pub fn set_by_name<T: Any + Send + Sync>(&mut self, name: &str, value: T) -> ParamId {
        let id = ParameterLayout::global().register(name);
        self.set(id, value);
        id
    }

    /// Builder form of `set`
    pub fn with<T: Any + Send + Sync>(mut self, id: ParamId, value: T) -> Self {
        self.set(id, value);
        self
    }

    pub fn contains(&self, id: ParamId) -> bool {
        matches!(self.values.get(id.index()), Some(Some(_)))
    }

    /// Typed read; `None` when unset or holding another type
    pub fn get<T: Any>(&self, id: ParamId) -> Option<&T> {
        self.values.get(id.index())?.as_ref()?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Any>(&mut self, id: ParamId) -> Option<&mut T> {
        self.values.get_mut(id.index())?.as_mut()?.downcast_mut::<T>()
    }

    /// Typed read that fails with `InvalidParameter` when the slot is unset
    /// or holds another type
    pub fn value_checked<T: Any>(&self, id: ParamId) -> Result<&T> {
        match self.values.get(id.index()) {
            Some(Some(value)) => match value.downcast_ref::<T>() {
                Some(value) => Ok(value),
                None => engine_bail!(InvalidParameter => "galaxy3d::ParameterSet",
                    "Parameter '{}' does not hold a {}", slot_name(id), type_name::<T>()),
            },
            _ => engine_bail!(InvalidParameter => "galaxy3d::ParameterSet",
                "Parameter '{}' is not set", slot_name(id)),
        }
    }

    /// Find the value of a slot, creating it with `create` when unset
    ///
    /// Returns `InvalidParameter` if the slot holds another type.
    pub fn get_or_insert_with<T: Any + Send + Sync>(
        &mut self,
        id: ParamId,
        create: impl FnOnce() -> T,
    ) -> Result<&mut T> {
        if !self.contains(id) {
            self.set(id, create());
        }
        match self.get_mut::<T>(id) {
            Some(value) => Ok(value),
            None => engine_bail!(InvalidParameter => "galaxy3d::ParameterSet",
                "Parameter '{}' does not hold a {}", slot_name(id), type_name::<T>()),
        }
    }

    /// Remove and return a typed value. A value of another type stays in place.
    pub fn take<T: Any>(&mut self, id: ParamId) -> Option<T> {
        let slot = self.values.get_mut(id.index())?;
        if !slot.as_ref()?.is::<T>() {
            return None;
        }
        slot.take()?.downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Clear one slot. Returns false if it was unset.
    pub fn remove(&mut self, id: ParamId) -> bool {
        match self.values.get_mut(id.index()) {
            Some(slot) => slot.take().is_some(),
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of set slots
    pub fn len(&self) -> usize {
        self.values.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Boolean flag; unset or non-bool slots read as false
    pub fn flag(&self, id: ParamId) -> bool {
        self.get::<bool>(id).copied().unwrap_or(false)
    }

    /// The resource manager stored in the built-in slot
    pub fn resource_manager(&self) -> Result<&Arc<ResourceManager>> {
        self.value_checked::<Arc<ResourceManager>>(builtin::RESOURCE_MANAGER)
    }

    /// Whether loads must leave existing resources untouched
    pub fn no_overwrite(&self) -> bool {
        self.flag(builtin::NO_OVERWRITE)
    }
}

fn slot_name(id: ParamId) -> String {
    ParameterLayout::global()
        .name(id)
        .unwrap_or_else(|| format!("#{}", id.index()))
}

impl fmt::Debug for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set: Vec<String> = self
            .values
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| slot_name(ParamId::from_index(index)))
            .collect();
        f.debug_struct("ParameterSet").field("set", &set).finish()
    }
}

#[cfg(test)]
#[path = "parameter_tests.rs"]
mod tests;
