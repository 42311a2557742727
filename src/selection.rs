//! Rectangle selection over a displayed image.
//!
//! The image is shown scaled to fit the display, so pointer positions arrive
//! in display coordinates. Every position is converted to source-image pixel
//! coordinates through the display/image scale ratio before any geometry is
//! computed; pointer and touch input go through the same three calls.

use image::RgbaImage;

/// Selections narrower or shorter than this (in image pixels) are treated
/// as accidental taps and discarded on release.
pub const MIN_SELECTION_PX: f32 = 10.0;

/// Axis-aligned rectangle in source-image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Clamps the rectangle to the bounds of `img`, shrinking it if needed.
    pub fn clamped_to(&self, img: &RgbaImage) -> PixelRect {
        let (w, h) = img.dimensions();
        let x = self.x.min(w.saturating_sub(1));
        let y = self.y.min(h.saturating_sub(1));
        PixelRect {
            x,
            y,
            width: self.width.min(w - x),
            height: self.height.min(h - y),
        }
    }
}

/// Maps display coordinates onto image pixel coordinates.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub display_width: f32,
    pub display_height: f32,
    pub image_width: u32,
    pub image_height: u32,
}

impl Viewport {
    pub fn new(display_width: f32, display_height: f32, img: &RgbaImage) -> Self {
        let (image_width, image_height) = img.dimensions();
        Self {
            display_width,
            display_height,
            image_width,
            image_height,
        }
    }

    fn to_image(&self, display_x: f32, display_y: f32) -> (f32, f32) {
        let scale_x = self.image_width as f32 / self.display_width;
        let scale_y = self.image_height as f32 / self.display_height;
        (display_x * scale_x, display_y * scale_y)
    }
}

/// In-progress drag rectangle, kept in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
struct DragRect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

/// Tracks one press → move* → release gesture.
///
/// The selection overlay is drawn from `current()`; the underlying image
/// buffer is never touched here.
#[derive(Debug, Default)]
pub struct DragSelection {
    start: Option<(f32, f32)>,
    area: Option<DragRect>,
}

impl DragSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer or touch press at a display position. Clears any prior area.
    pub fn press(&mut self, viewport: &Viewport, display_x: f32, display_y: f32) {
        self.start = Some(viewport.to_image(display_x, display_y));
        self.area = None;
    }

    /// Pointer or touch move. Ignored unless a press is active.
    pub fn drag(&mut self, viewport: &Viewport, display_x: f32, display_y: f32) {
        let Some((start_x, start_y)) = self.start else {
            return;
        };
        let (current_x, current_y) = viewport.to_image(display_x, display_y);
        self.area = Some(DragRect {
            x: start_x.min(current_x),
            y: start_y.min(current_y),
            width: (current_x - start_x).abs(),
            height: (current_y - start_y).abs(),
        });
    }

    /// Ends the gesture. Returns the accepted rectangle, or None when the
    /// drag never moved or stayed within the accidental-tap threshold.
    pub fn release(&mut self) -> Option<PixelRect> {
        self.start = None;
        let area = self.area.take()?;
        if area.width > MIN_SELECTION_PX && area.height > MIN_SELECTION_PX {
            Some(PixelRect {
                x: area.x.max(0.0) as u32,
                y: area.y.max(0.0) as u32,
                width: area.width as u32,
                height: area.height as u32,
            })
        } else {
            None
        }
    }

    /// Current rectangle for overlay drawing, in image pixel coordinates.
    pub fn current(&self) -> Option<(f32, f32, f32, f32)> {
        self.area.map(|a| (a.x, a.y, a.width, a.height))
    }
}
