//! Recognition session lifecycle.
//!
//! One engine instance serves the whole session. A mutex keeps recognitions
//! strictly one-at-a-time, and every result carries the capture generation
//! it was computed against so a result arriving after a retake can be told
//! apart from a current one.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use image::RgbaImage;

use super::engine::Engine;
use super::extract::clean_product_number;
use super::preprocess::{crop_selection, grayscale_contrast};
use crate::selection::PixelRect;

/// Result of one recognition call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionOutcome {
    /// Capture generation of the image the recognition ran on.
    pub generation: u64,
    /// Cleaned product number; empty when the engine output was rejected.
    pub product_number: String,
}

impl RecognitionOutcome {
    pub fn is_accepted(&self) -> bool {
        !self.product_number.is_empty()
    }
}

/// Session-scoped recognition adapter.
pub struct OcrSession {
    engine: Mutex<Engine>,
    contrast: f32,
    timeout: Duration,
}

impl OcrSession {
    /// Initializes the engine once for the session.
    pub fn initialize(contrast: f32, timeout: Duration) -> Result<Self> {
        Ok(Self {
            engine: Mutex::new(Engine::initialize()?),
            contrast,
            timeout,
        })
    }

    /// Crops `rect` out of `image`, preprocesses it, and runs the engine.
    ///
    /// Serialized: a second caller blocks until the in-flight recognition
    /// completes or fails.
    pub fn recognize(
        &self,
        image: &RgbaImage,
        rect: &PixelRect,
        generation: u64,
    ) -> Result<RecognitionOutcome> {
        let cropped = crop_selection(image, rect);
        let prepared = grayscale_contrast(&cropped, self.contrast);

        let raw = {
            let mut engine = self.engine.lock().unwrap_or_else(|e| e.into_inner());
            engine.recognize_digits(&prepared, self.timeout)?
        };

        let product_number = clean_product_number(&raw);
        if product_number.is_empty() {
            crate::log("Recognition produced no usable product number");
        } else {
            crate::log(&format!("Recognized product number: {}", product_number));
        }

        Ok(RecognitionOutcome {
            generation,
            product_number,
        })
    }

    /// Tears the engine down, releasing its scratch resources.
    ///
    /// Call when the session ends; dropping the session has the same effect,
    /// the explicit form just makes the hand-back visible at the call site.
    pub fn teardown(self) {
        crate::log("Recognition engine torn down");
    }
}
