/// Effect resource: shader program source, compiled on the device at commit.

use std::sync::Arc;
use crate::cache::{LoadContext, ResourceData};
use crate::device::{Device, DeviceHandle, DeviceResourceKind, UploadSlot};
use crate::error::Result;

pub struct Effect {
    label: String,
    source: Arc<[u8]>,
    program: UploadSlot,
}

impl Effect {
    /// Create an effect from program source
    ///
    /// # Arguments
    ///
    /// * `label` - Debug label passed to the device
    /// * `source` - Program source bytes
    /// * `device` - Device compiling the program; `None` keeps the effect host-only
    pub fn new(label: impl Into<String>, source: impl Into<Arc<[u8]>>, device: Option<Arc<dyn Device>>) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
            program: UploadSlot::new(DeviceResourceKind::Effect, device),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Replace the source; the program is rebuilt on the next commit
    pub fn set_source(&mut self, source: impl Into<Arc<[u8]>>) {
        self.source = source.into();
        self.program.invalidate();
    }

    /// Device program, once committed
    pub fn program(&self) -> Option<DeviceHandle> {
        self.program.handle()
    }

    pub fn compile_count(&self) -> u32 {
        self.program.upload_count()
    }
}

impl ResourceData for Effect {
    const KIND: &'static str = "Effect";

    fn load(ctx: &LoadContext<'_>) -> Result<Self> {
        let device = ctx.manager.as_ref().map(|manager| Arc::clone(manager.device()));
        Ok(Effect::new(
            ctx.path.display().to_string(),
            ctx.content.bytes(),
            device,
        ))
    }

    fn needs_commit(&self) -> bool {
        self.program.is_pending()
    }

    fn commit(&mut self) -> Result<()> {
        self.program.upload(&self.label, &self.source)
    }
}
