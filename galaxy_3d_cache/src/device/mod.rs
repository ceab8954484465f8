/// Device module - opaque backend interface and device-side resources

pub mod device;
pub mod null_device;
pub mod upload_slot;

pub use device::*;
pub use null_device::NullDevice;
pub use upload_slot::UploadSlot;

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
