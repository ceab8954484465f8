/// Device that keeps uploads in host memory.
///
/// Used by tools that only need the cache side of the engine, and by tests.
/// It tracks live handles so leaks and double releases are observable, and
/// can be told to refuse uploads to exercise failure paths.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::{engine_bail, engine_trace};
use super::device::{Device, DeviceHandle, DeviceResourceDesc, DeviceResourceKind};

pub struct NullDevice {
    next_handle: AtomicU64,
    live: Mutex<FxHashMap<DeviceHandle, DeviceResourceKind>>,
    refuse_uploads: AtomicBool,
    created: AtomicU64,
}

impl NullDevice {
    pub fn new() -> Self {
        Self {
            next_handle: AtomicU64::new(1),
            live: Mutex::new(FxHashMap::default()),
            refuse_uploads: AtomicBool::new(false),
            created: AtomicU64::new(0),
        }
    }

    /// Make every following `create_resource` fail with `DeviceCreation`
    pub fn set_refuse_uploads(&self, refuse: bool) {
        self.refuse_uploads.store(refuse, Ordering::SeqCst);
    }

    /// Total number of objects ever created
    pub fn created_count(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }

    pub fn is_live(&self, handle: DeviceHandle) -> bool {
        self.live.lock().contains_key(&handle)
    }

    /// Live objects of one kind
    pub fn live_of_kind(&self, kind: DeviceResourceKind) -> usize {
        self.live.lock().values().filter(|k| **k == kind).count()
    }
}

impl Default for NullDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for NullDevice {
    fn name(&self) -> &str {
        "NullDevice"
    }

    fn create_resource(&self, desc: &DeviceResourceDesc) -> Result<DeviceHandle> {
        if self.refuse_uploads.load(Ordering::SeqCst) {
            engine_bail!(DeviceCreation => "galaxy3d::NullDevice",
                "Upload of {:?} '{}' refused", desc.kind, desc.label);
        }
        let handle = DeviceHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.live.lock().insert(handle, desc.kind);
        self.created.fetch_add(1, Ordering::SeqCst);
        engine_trace!("galaxy3d::NullDevice", "Created {:?} '{}' ({} bytes) as {:?}",
            desc.kind, desc.label, desc.bytes.len(), handle);
        Ok(handle)
    }

    fn release_resource(&self, handle: DeviceHandle) {
        self.live.lock().remove(&handle);
    }

    fn live_resources(&self) -> usize {
        self.live.lock().len()
    }
}
