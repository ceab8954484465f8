/// Deferred device upload owned by a resource.
///
/// Resources load their bytes on the caller's thread and upload them to the
/// device later, when their cache commits. The slot remembers the device,
/// holds the created `DeviceResource`, and forgets it when the source bytes
/// change so the next commit uploads again.

use std::sync::Arc;
use crate::error::Result;
use super::device::{Device, DeviceHandle, DeviceResource, DeviceResourceDesc, DeviceResourceKind};

pub struct UploadSlot {
    kind: DeviceResourceKind,
    device: Option<Arc<dyn Device>>,
    resource: Option<DeviceResource>,
    uploads: u32,
}

impl UploadSlot {
    /// Create an empty slot; without a device nothing is ever uploaded
    pub fn new(kind: DeviceResourceKind, device: Option<Arc<dyn Device>>) -> Self {
        Self {
            kind,
            device,
            resource: None,
            uploads: 0,
        }
    }

    /// A device is attached and the current bytes are not uploaded yet
    pub fn is_pending(&self) -> bool {
        self.device.is_some() && self.resource.is_none()
    }

    /// Upload `bytes`, replacing any previous device object
    ///
    /// No-op without a device.
    pub fn upload(&mut self, label: &str, bytes: &Arc<[u8]>) -> Result<()> {
        let Some(device) = &self.device else {
            return Ok(());
        };
        let desc = DeviceResourceDesc {
            kind: self.kind,
            label: label.to_string(),
            bytes: Arc::clone(bytes),
        };
        let resource = DeviceResource::create(device, &desc)?;
        self.resource = Some(resource);
        self.uploads += 1;
        Ok(())
    }

    /// Release the device object; the next commit uploads again
    pub fn invalidate(&mut self) {
        self.resource = None;
    }

    pub fn handle(&self) -> Option<DeviceHandle> {
        self.resource.as_ref().map(DeviceResource::handle)
    }

    pub fn device(&self) -> Option<&Arc<dyn Device>> {
        self.device.as_ref()
    }

    /// Number of successful uploads over the slot's lifetime
    pub fn upload_count(&self) -> u32 {
        self.uploads
    }
}
