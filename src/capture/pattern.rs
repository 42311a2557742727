//! Synthetic capture backend.
//!
//! Produces a fixed label-like frame after a short warmup, standing in for
//! real camera hardware on hosts without one. The `no_frames` variant never
//! delivers a frame, which exercises the bounded-wait timeout path.

use std::thread;
use std::time::Duration;

use image::{Rgba, RgbaImage};

use super::device::{CaptureDevice, CaptureError};

const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;

/// Frame source returning synthetic still images.
pub struct PatternDevice {
    warmup: Duration,
    delivers_frames: bool,
}

impl PatternDevice {
    /// A device that delivers a light frame with a dark label band.
    pub fn label_frame() -> Self {
        Self {
            warmup: Duration::from_millis(10),
            delivers_frames: true,
        }
    }

    /// A device that is readable but never produces a frame.
    pub fn no_frames() -> Self {
        Self {
            warmup: Duration::ZERO,
            delivers_frames: false,
        }
    }

    fn render_frame() -> RgbaImage {
        RgbaImage::from_fn(FRAME_WIDTH, FRAME_HEIGHT, |_, y| {
            // Dark horizontal band across the middle, light elsewhere,
            // roughly the shape of a printed label on packaging.
            if (200..280).contains(&y) {
                Rgba([40, 40, 40, 255])
            } else {
                Rgba([220, 220, 220, 255])
            }
        })
    }
}

impl CaptureDevice for PatternDevice {
    fn next_frame(&mut self, timeout: Duration) -> Result<RgbaImage, CaptureError> {
        if !self.delivers_frames {
            thread::sleep(timeout.min(Duration::from_millis(50)));
            return Err(CaptureError::Timeout(timeout));
        }
        if self.warmup >= timeout {
            thread::sleep(timeout);
            return Err(CaptureError::Timeout(timeout));
        }
        thread::sleep(self.warmup);
        Ok(Self::render_frame())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_frame_has_expected_dimensions() {
        let mut device = PatternDevice::label_frame();
        let frame = device.next_frame(Duration::from_secs(1)).unwrap();
        assert_eq!(frame.dimensions(), (FRAME_WIDTH, FRAME_HEIGHT));
        // Band row is dark, top row is light.
        assert_eq!(frame.get_pixel(0, 240)[0], 40);
        assert_eq!(frame.get_pixel(0, 0)[0], 220);
    }

    #[test]
    fn test_no_frames_times_out() {
        let mut device = PatternDevice::no_frames();
        match device.next_frame(Duration::from_millis(20)) {
            Err(CaptureError::Timeout(_)) => {}
            other => panic!("expected Timeout, got {:?}", other.map(|_| ())),
        }
    }
}
