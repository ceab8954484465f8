/// Device trait and device-side resources.
///
/// The graphics/physics backend is opaque: it hands out `DeviceHandle`s for
/// uploaded data and takes them back on release. A `DeviceResource` owns one
/// handle and releases it when dropped.

use std::fmt;
use std::sync::Arc;
use crate::error::Result;

/// Opaque identifier of a device-side object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle(pub u64);

/// What a device-side object holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceResourceKind {
    /// Image data
    Texture,
    /// Compiled shader program
    Effect,
    /// Collision geometry
    Shape,
}

/// Descriptor for creating a device-side object
#[derive(Debug, Clone)]
pub struct DeviceResourceDesc {
    pub kind: DeviceResourceKind,
    /// Debug label (usually the source file or resource name)
    pub label: String,
    /// Payload to upload
    pub bytes: Arc<[u8]>,
}

/// Backend abstraction
pub trait Device: Send + Sync {
    /// Backend name for diagnostics
    fn name(&self) -> &str;

    /// Upload data and create a device-side object
    ///
    /// Fails with `DeviceCreation` when the backend refuses the data.
    fn create_resource(&self, desc: &DeviceResourceDesc) -> Result<DeviceHandle>;

    /// Release a device-side object. Unknown handles are ignored.
    fn release_resource(&self, handle: DeviceHandle);

    /// Number of device-side objects currently alive
    fn live_resources(&self) -> usize;
}

// ===== RAII OWNER =====

/// A device-side object released on drop
pub struct DeviceResource {
    device: Arc<dyn Device>,
    handle: DeviceHandle,
    kind: DeviceResourceKind,
    size: usize,
}

impl DeviceResource {
    /// Create a device-side object from a descriptor
    pub fn create(device: &Arc<dyn Device>, desc: &DeviceResourceDesc) -> Result<Self> {
        let handle = device.create_resource(desc)?;
        Ok(Self {
            device: Arc::clone(device),
            handle,
            kind: desc.kind,
            size: desc.bytes.len(),
        })
    }

    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    pub fn kind(&self) -> DeviceResourceKind {
        self.kind
    }

    /// Uploaded payload size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn device(&self) -> &Arc<dyn Device> {
        &self.device
    }
}

impl Drop for DeviceResource {
    fn drop(&mut self) {
        self.device.release_resource(self.handle);
    }
}

impl fmt::Debug for DeviceResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceResource")
            .field("device", &self.device.name())
            .field("handle", &self.handle)
            .field("kind", &self.kind)
            .field("size", &self.size)
            .finish()
    }
}
