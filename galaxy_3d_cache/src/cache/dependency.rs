/// Dependency graph between resources.
///
/// Each resource owns a lazily created `DependencySet` listing the resources
/// that were built from it. Edges are non-owning (`Weak`), insertion ordered
/// and deduplicated. `notify_dependents` pushes a change through the graph
/// breadth-first, refreshing every reachable dependent exactly once.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;

// ===== NODE TRAIT =====

/// A resource taking part in change propagation
pub trait DependencyNode: Send + Sync {
    /// Dependents set, if one was ever created
    fn dependents(&self) -> Option<&DependencySet>;

    /// Dependents set, created on demand
    fn dependency_set(&self) -> &DependencySet;

    /// Resources this node currently reads
    fn upstream(&self) -> Vec<Arc<dyn DependencyNode>> {
        Vec::new()
    }

    /// Refresh hook
    fn on_dependency_changed(&self);

    /// Kind label for diagnostics
    fn kind(&self) -> &'static str;
}

/// Identity of a node, independent of the trait object's vtable
pub fn node_address(node: &Arc<dyn DependencyNode>) -> usize {
    Arc::as_ptr(node) as *const () as usize
}

fn weak_address(node: &Weak<dyn DependencyNode>) -> usize {
    Weak::as_ptr(node) as *const () as usize
}

// ===== DEPENDENCY SET =====

pub struct DependencySet {
    dependents: Mutex<Vec<Weak<dyn DependencyNode>>>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self {
            dependents: Mutex::new(Vec::new()),
        }
    }

    /// Register a dependent. Returns false if it was already registered.
    pub fn add(&self, dependent: &Arc<dyn DependencyNode>) -> bool {
        let address = node_address(dependent);
        let mut dependents = self.dependents.lock();
        if dependents.iter().any(|w| weak_address(w) == address) {
            return false;
        }
        dependents.push(Arc::downgrade(dependent));
        true
    }

    /// Unregister a dependent. Returns false if it was not registered.
    pub fn remove(&self, dependent: &Arc<dyn DependencyNode>) -> bool {
        let address = node_address(dependent);
        let mut dependents = self.dependents.lock();
        let before = dependents.len();
        dependents.retain(|w| weak_address(w) != address);
        dependents.len() != before
    }

    pub fn contains(&self, dependent: &Arc<dyn DependencyNode>) -> bool {
        let address = node_address(dependent);
        self.dependents.lock().iter().any(|w| weak_address(w) == address)
    }

    /// Live dependents in registration order; dropped ones are pruned
    pub fn live(&self) -> Vec<Arc<dyn DependencyNode>> {
        let mut dependents = self.dependents.lock();
        dependents.retain(|w| w.strong_count() > 0);
        dependents.iter().filter_map(Weak::upgrade).collect()
    }

    /// Number of live dependents
    pub fn len(&self) -> usize {
        self.dependents.lock().iter().filter(|w| w.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move every edge of `other` into this set (used when a resource is replaced)
    pub fn absorb(&self, other: &DependencySet) {
        let taken: Vec<_> = std::mem::take(&mut *other.dependents.lock());
        for weak in taken {
            if let Some(node) = weak.upgrade() {
                self.add(&node);
            }
        }
    }
}

impl Default for DependencySet {
    fn default() -> Self {
        Self::new()
    }
}

// ===== LINKING =====

/// Register `node` as a dependent of every entry of `current`, and
/// unregister it from entries of `previous` it no longer reads
pub fn relink(
    node: &Arc<dyn DependencyNode>,
    previous: &[Arc<dyn DependencyNode>],
    current: &[Arc<dyn DependencyNode>],
) {
    for old in previous {
        let address = node_address(old);
        if !current.iter().any(|dep| node_address(dep) == address) {
            old.dependency_set().remove(node);
        }
    }
    for dep in current {
        dep.dependency_set().add(node);
    }
}

// ===== NOTIFICATION WALK =====

/// Refresh every dependent reachable from `sources`
///
/// Breadth-first; each node is visited at most once per walk, so cycles
/// terminate. Sources are considered visited up front and are never
/// refreshed themselves. No lock is held while a refresh hook runs. A hook
/// may swap what its node reads; the node's edges follow its new `upstream`.
///
/// Returns the number of refreshed dependents.
pub fn notify_dependents(sources: &[Arc<dyn DependencyNode>]) -> usize {
    let mut visited: FxHashSet<usize> = sources.iter().map(node_address).collect();
    let mut queue: VecDeque<Arc<dyn DependencyNode>> = sources.iter().cloned().collect();
    let mut notified = 0;

    while let Some(node) = queue.pop_front() {
        let Some(set) = node.dependents() else {
            continue;
        };
        for dependent in set.live() {
            if visited.insert(node_address(&dependent)) {
                let before = dependent.upstream();
                dependent.on_dependency_changed();
                relink(&dependent, &before, &dependent.upstream());
                notified += 1;
                queue.push_back(dependent);
            }
        }
    }

    notified
}

#[cfg(test)]
#[path = "dependency_tests.rs"]
mod tests;
