/// Resource caching: shared resource cells, keyed indices, per-type caches
/// and the dependency graph used to propagate changes.

pub mod component_monitor;
pub mod dependency;
pub mod resource;
pub mod resource_cache;
pub mod resource_index;

pub use component_monitor::{ComponentMonitor, MonitorTicks};
pub use dependency::{notify_dependents, DependencyNode, DependencySet};
pub use resource::{as_node, CacheId, LoadContext, Resource, ResourceData, ResourceKey, ResourceOwner, ResourceRef};
pub use resource_cache::{CacheDesc, ResourceCache};
pub use resource_index::{BindingPolicy, ComponentState, ResourceIndex, ResourceInfo, ResourceSummary};
