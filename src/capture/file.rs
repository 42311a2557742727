//! Still-image acquisition from a user-picked file.

use std::path::Path;

use anyhow::{Context, Result};
use image::RgbaImage;

/// Reads and decodes an image file into the shared RGBA representation.
///
/// Any format the `image` crate can decode is accepted; the decoded buffer
/// is what the selection and recognition stages operate on, so there is no
/// further quality loss past this point.
pub fn acquire_from_file(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to load image file: {}", path.display()))?;
    Ok(img.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    #[test]
    fn test_acquire_from_file_round_trips_pixels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("label.png");

        let img = RgbaImage::from_pixel(8, 6, Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();

        let loaded = acquire_from_file(&path).unwrap();
        assert_eq!(loaded.dimensions(), (8, 6));
        assert_eq!(loaded.get_pixel(3, 3), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_acquire_from_missing_file_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.png");
        assert!(acquire_from_file(&missing).is_err());
    }
}
