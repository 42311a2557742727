//! Still-image acquisition from a capture device.
//!
//! A device is opened exclusively: at most one handle exists at a time, and
//! the handle must be released (dropped) before another open succeeds. Each
//! failure mode maps to its own error so the UI can show a specific message.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use image::RgbaImage;
use thiserror::Error;

/// Errors produced while opening a device or waiting for a frame.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no supported capture device is available")]
    Unsupported,
    #[error("camera access was denied")]
    PermissionDenied,
    #[error("the camera is already in use")]
    Busy,
    #[error("the camera produced no frame within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Pluggable frame source. Each backend implements this trait.
pub trait CaptureDevice: Send {
    /// Blocks until a ready frame is available, up to `timeout`.
    fn next_frame(&mut self, timeout: Duration) -> Result<RgbaImage, CaptureError>;
}

/// Set while a DeviceHandle is alive. Enforces the single active stream.
static DEVICE_HELD: AtomicBool = AtomicBool::new(false);

/// Exclusive handle to the active capture device.
///
/// The device lock is released when the handle is dropped, so every exit
/// path from a capture screen gives the device back.
pub struct DeviceHandle {
    inner: Box<dyn CaptureDevice>,
}

impl DeviceHandle {
    /// Acquires one still image from the device.
    pub fn still(&mut self, timeout: Duration) -> Result<RgbaImage, CaptureError> {
        self.inner.next_frame(timeout)
    }

    /// Releases the device explicitly. Equivalent to dropping the handle.
    pub fn release(self) {}
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        DEVICE_HELD.store(false, Ordering::SeqCst);
    }
}

/// Opens the capture device named by the `selector` config string.
///
/// Selectors: `pattern` for the synthetic frame source, optionally suffixed
/// with a fault mode (`pattern:deny`, `pattern:noframe`) for exercising the
/// error paths, and `none` for hosts without any capture hardware.
pub fn open_device(selector: &str) -> Result<DeviceHandle, CaptureError> {
    if DEVICE_HELD.swap(true, Ordering::SeqCst) {
        return Err(CaptureError::Busy);
    }

    let opened = open_backend(selector);
    if opened.is_err() {
        DEVICE_HELD.store(false, Ordering::SeqCst);
    }
    opened.map(|inner| DeviceHandle { inner })
}

fn open_backend(selector: &str) -> Result<Box<dyn CaptureDevice>, CaptureError> {
    let (kind, mode) = match selector.split_once(':') {
        Some((kind, mode)) => (kind, Some(mode)),
        None => (selector, None),
    };

    match kind {
        "pattern" => match mode {
            None => Ok(Box::new(crate::capture::PatternDevice::label_frame())),
            Some("deny") => Err(CaptureError::PermissionDenied),
            Some("noframe") => Ok(Box::new(crate::capture::PatternDevice::no_frames())),
            Some(other) => {
                crate::log(&format!("Unknown pattern device mode: {}", other));
                Err(CaptureError::Unsupported)
            }
        },
        _ => Err(CaptureError::Unsupported),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::serial;
    use super::*;

    #[test]
    fn test_second_open_is_busy_until_release() {
        let _guard = serial();
        let first = open_device("pattern").unwrap();

        match open_device("pattern") {
            Err(CaptureError::Busy) => {}
            other => panic!("expected Busy, got {:?}", other.map(|_| ())),
        }

        first.release();
        let again = open_device("pattern").unwrap();
        drop(again);
    }

    #[test]
    fn test_unknown_selector_is_unsupported_and_releases_lock() {
        let _guard = serial();
        match open_device("webcam9000") {
            Err(CaptureError::Unsupported) => {}
            other => panic!("expected Unsupported, got {:?}", other.map(|_| ())),
        }

        // The failed open must not leave the device lock held.
        let handle = open_device("pattern").unwrap();
        drop(handle);
    }

    #[test]
    fn test_denied_selector_maps_to_permission_error() {
        let _guard = serial();
        match open_device("pattern:deny") {
            Err(CaptureError::PermissionDenied) => {}
            other => panic!("expected PermissionDenied, got {:?}", other.map(|_| ())),
        }
        let handle = open_device("pattern").unwrap();
        drop(handle);
    }
}
