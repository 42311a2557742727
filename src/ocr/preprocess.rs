//! Image preparation ahead of recognition.
//!
//! The selected region is cropped into its own buffer, converted to
//! grayscale with the usual luminance weights, and pushed through a linear
//! contrast stretch so faint print separates from the label background.

use image::{ImageBuffer, Luma, RgbaImage};

use crate::selection::PixelRect;

/// Midpoint the contrast stretch pivots around.
const CONTRAST_MIDPOINT: f32 = 128.0;

/// Crops the selected rectangle into a new buffer sized exactly
/// `width x height` (after clamping the rectangle to the image bounds).
pub fn crop_selection(img: &RgbaImage, rect: &PixelRect) -> RgbaImage {
    let rect = rect.clamped_to(img);
    image::imageops::crop_imm(img, rect.x, rect.y, rect.width, rect.height).to_image()
}

/// Converts to grayscale via luminance weighting and stretches contrast
/// around the midpoint by `contrast`, clamping to [0, 255].
pub fn grayscale_contrast(img: &RgbaImage, contrast: f32) -> ImageBuffer<Luma<u8>, Vec<u8>> {
    let (width, height) = img.dimensions();
    let mut output = ImageBuffer::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let gray = (0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32)
            .round();
        let enhanced = ((gray - CONTRAST_MIDPOINT) * contrast + CONTRAST_MIDPOINT)
            .clamp(0.0, 255.0) as u8;
        output.put_pixel(x, y, Luma([enhanced]));
    }

    output
}
