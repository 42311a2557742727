pub mod device;
pub mod file;
pub mod pattern;

pub use device::{open_device, CaptureDevice, CaptureError, DeviceHandle};
pub use file::acquire_from_file;
pub use pattern::PatternDevice;
