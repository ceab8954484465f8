/// Shape resource: collision geometry serialized by the physics backend.
///
/// Files are framed as a little-endian `u32` payload length followed by the
/// payload. The payload itself is opaque and handed to the device as-is.

use std::sync::Arc;
use crate::cache::{LoadContext, ResourceData};
use crate::device::{Device, DeviceHandle, DeviceResourceKind, UploadSlot};
use crate::error::Result;
use crate::engine_bail;

const LENGTH_PREFIX: usize = 4;

pub struct Shape {
    label: String,
    payload: Arc<[u8]>,
    geometry: UploadSlot,
}

impl Shape {
    pub fn new(label: impl Into<String>, payload: impl Into<Arc<[u8]>>, device: Option<Arc<dyn Device>>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
            geometry: UploadSlot::new(DeviceResourceKind::Shape, device),
        }
    }

    /// Split a framed blob into its payload
    ///
    /// Fails with `Deserialization` when the blob is shorter than the prefix
    /// or the prefix disagrees with the payload length.
    pub fn decode(blob: &[u8]) -> Result<&[u8]> {
        let Some((prefix, payload)) = blob.split_first_chunk::<LENGTH_PREFIX>() else {
            engine_bail!(Deserialization => "galaxy3d::Shape",
                "Shape blob is {} byte(s), shorter than its length prefix", blob.len());
        };
        let declared = u32::from_le_bytes(*prefix) as usize;
        if declared != payload.len() {
            engine_bail!(Deserialization => "galaxy3d::Shape",
                "Shape blob declares {} payload byte(s) but holds {}", declared, payload.len());
        }
        Ok(payload)
    }

    /// Frame a payload for storage
    ///
    /// Fails with `Deserialization` when the payload length does not fit the
    /// `u32` prefix.
    pub fn encode(payload: &[u8]) -> Result<Vec<u8>> {
        let prefix = Self::length_prefix(payload.len())?;
        let mut blob = Vec::with_capacity(LENGTH_PREFIX + payload.len());
        blob.extend_from_slice(&prefix);
        blob.extend_from_slice(payload);
        Ok(blob)
    }

    pub(crate) fn length_prefix(len: usize) -> Result<[u8; LENGTH_PREFIX]> {
        match u32::try_from(len) {
            Ok(len) => Ok(len.to_le_bytes()),
            Err(_) => engine_bail!(Deserialization => "galaxy3d::Shape",
                "Shape payload of {} byte(s) exceeds the u32 length prefix", len),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Device geometry, once committed
    pub fn geometry(&self) -> Option<DeviceHandle> {
        self.geometry.handle()
    }
}

impl ResourceData for Shape {
    const KIND: &'static str = "Shape";

    fn load(ctx: &LoadContext<'_>) -> Result<Self> {
        let payload = Shape::decode(ctx.content.bytes())?;
        let device = ctx.manager.as_ref().map(|manager| Arc::clone(manager.device()));
        Ok(Shape::new(ctx.path.display().to_string(), payload, device))
    }

    fn needs_commit(&self) -> bool {
        self.geometry.is_pending()
    }

    fn commit(&mut self) -> Result<()> {
        self.geometry.upload(&self.label, &self.payload)
    }
}
