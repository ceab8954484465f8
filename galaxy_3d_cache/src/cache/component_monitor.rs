/// Change counters shared by the caches of one resource manager.
///
/// Observers (editor panels, property binders) remember the ticks they last
/// saw and compare them to detect staleness.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ComponentMonitor {
    structure: AtomicU64,
    data: AtomicU64,
}

/// Counter values at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorTicks {
    pub structure: u64,
    pub data: u64,
}

impl ComponentMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries were added, removed, renamed or replaced
    pub fn structure_changed(&self) {
        self.structure.fetch_add(1, Ordering::Relaxed);
    }

    /// Resource contents changed
    pub fn data_changed(&self) {
        self.data.fetch_add(1, Ordering::Relaxed);
    }

    pub fn structure_tick(&self) -> u64 {
        self.structure.load(Ordering::Relaxed)
    }

    pub fn data_tick(&self) -> u64 {
        self.data.load(Ordering::Relaxed)
    }

    pub fn ticks(&self) -> MonitorTicks {
        MonitorTicks {
            structure: self.structure_tick(),
            data: self.data_tick(),
        }
    }

    /// Whether anything changed since `seen` was taken
    pub fn changed_since(&self, seen: MonitorTicks) -> bool {
        self.ticks() != seen
    }
}
