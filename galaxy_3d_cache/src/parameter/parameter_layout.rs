/// ParameterLayout - process-wide registry of parameter slot names.
///
/// Each name maps to a dense `ParamId`, assigned in registration order and
/// never reused. The built-in slots are registered first, in a fixed order,
/// so their ids are compile-time constants.

use std::sync::OnceLock;
use indexmap::IndexSet;
use parking_lot::RwLock;
use crate::engine_debug;

/// Dense index of a parameter slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(u32);

impl ParamId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        ParamId(index as u32)
    }
}

/// Built-in slots shared by every caller
pub mod builtin {
    use super::ParamId;

    /// `Arc<dyn Device>`
    pub const DEVICE: ParamId = ParamId(0);
    /// `Arc<ResourceManager>`
    pub const RESOURCE_MANAGER: ParamId = ParamId(1);
    /// Caller-defined scene controller handle
    pub const SCENE_CONTROLLER: ParamId = ParamId(2);
    /// Caller-defined scene handle
    pub const SCENE: ParamId = ParamId(3);
    /// Caller-defined entity handle
    pub const ENTITY: ParamId = ParamId(4);
    /// Caller-defined simulation handle
    pub const SIMULATION: ParamId = ParamId(5);
    /// `bool`: loading must not overwrite existing resources
    pub const NO_OVERWRITE: ParamId = ParamId(6);
    /// `SaveQueue` of the running save session
    pub const SAVE_QUEUE: ParamId = ParamId(7);

    /// Names in id order
    pub(crate) const NAMES: [&str; 8] = [
        "Device",
        "ResourceManager",
        "SceneController",
        "Scene",
        "Entity",
        "Simulation",
        "NoOverwrite",
        "SaveQueue",
    ];
}

pub struct ParameterLayout {
    names: RwLock<IndexSet<String>>,
}

impl ParameterLayout {
    /// Create a layout holding only the built-in slots
    pub fn new() -> Self {
        let names = builtin::NAMES.iter().map(|n| n.to_string()).collect();
        Self {
            names: RwLock::new(names),
        }
    }

    /// The process-wide layout
    pub fn global() -> &'static ParameterLayout {
        static GLOBAL: OnceLock<ParameterLayout> = OnceLock::new();
        GLOBAL.get_or_init(ParameterLayout::new)
    }

    /// Id of `name`, registering it if needed
    pub fn register(&self, name: &str) -> ParamId {
        if let Some(id) = self.id(name) {
            return id;
        }
        let mut names = self.names.write();
        let (index, inserted) = names.insert_full(name.to_string());
        if inserted {
            engine_debug!("galaxy3d::ParameterLayout", "Parameter slot '{}' registered as #{}", name, index);
        }
        ParamId(index as u32)
    }

    /// Id of an already registered name
    pub fn id(&self, name: &str) -> Option<ParamId> {
        self.names.read().get_index_of(name).map(|index| ParamId(index as u32))
    }

    /// Name of a slot
    pub fn name(&self, id: ParamId) -> Option<String> {
        self.names.read().get_index(id.index()).cloned()
    }

    /// Number of registered slots
    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }

    /// Registered names in id order
    pub fn names(&self) -> Vec<String> {
        self.names.read().iter().cloned().collect()
    }
}

impl Default for ParameterLayout {
    fn default() -> Self {
        Self::new()
    }
}
