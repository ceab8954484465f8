/// Texture resource: encoded image bytes, uploaded to the device at commit.
///
/// The bytes are opaque to the cache; decoding is the device's concern.

use std::sync::Arc;
use crate::cache::{LoadContext, ResourceData};
use crate::device::{Device, DeviceHandle, DeviceResourceKind, UploadSlot};
use crate::error::Result;

pub struct Texture {
    label: String,
    pixels: Arc<[u8]>,
    image: UploadSlot,
}

impl Texture {
    /// Create a texture from encoded image bytes
    ///
    /// # Arguments
    ///
    /// * `label` - Debug label passed to the device
    /// * `pixels` - Encoded image bytes
    /// * `device` - Device receiving the upload; `None` keeps the texture host-only
    pub fn new(label: impl Into<String>, pixels: impl Into<Arc<[u8]>>, device: Option<Arc<dyn Device>>) -> Self {
        Self {
            label: label.into(),
            pixels: pixels.into(),
            image: UploadSlot::new(DeviceResourceKind::Texture, device),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Replace the image; it is uploaded again on the next commit
    pub fn set_pixels(&mut self, pixels: impl Into<Arc<[u8]>>) {
        self.pixels = pixels.into();
        self.image.invalidate();
    }

    /// Device image, once committed
    pub fn image(&self) -> Option<DeviceHandle> {
        self.image.handle()
    }

    pub fn upload_count(&self) -> u32 {
        self.image.upload_count()
    }
}

impl ResourceData for Texture {
    const KIND: &'static str = "Texture";

    fn load(ctx: &LoadContext<'_>) -> Result<Self> {
        let device = ctx.manager.as_ref().map(|manager| Arc::clone(manager.device()));
        Ok(Texture::new(
            ctx.path.display().to_string(),
            ctx.content.bytes(),
            device,
        ))
    }

    fn needs_commit(&self) -> bool {
        self.image.is_pending()
    }

    fn commit(&mut self) -> Result<()> {
        self.image.upload(&self.label, &self.pixels)
    }
}
