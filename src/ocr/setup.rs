use std::path::PathBuf;

use anyhow::{anyhow, Result};

/// Finds the Tesseract executable, checking PATH first, then common
/// installation locations.
pub fn find_tesseract_executable() -> Result<PathBuf> {
    if let Ok(output) = std::process::Command::new("tesseract")
        .arg("--version")
        .output()
    {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    let common_paths = [
        "/usr/bin/tesseract",
        "/usr/local/bin/tesseract",
        "/opt/homebrew/bin/tesseract",
    ];

    for path in &common_paths {
        let p = PathBuf::from(path);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!(
        "Tesseract not found. Please install Tesseract-OCR and ensure it is on PATH."
    ))
}

/// Finds a tessdata directory containing eng.traineddata, if one is needed.
///
/// Returns None when no explicit directory is found; the engine then relies
/// on the executable's built-in default.
pub fn find_tessdata_dir() -> Option<PathBuf> {
    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        for candidate in [PathBuf::from(&prefix), PathBuf::from(&prefix).join("tessdata")] {
            if candidate.join("eng.traineddata").exists() {
                return Some(candidate);
            }
        }
    }

    let system_paths = [
        "/usr/share/tesseract-ocr/5/tessdata",
        "/usr/share/tesseract-ocr/4.00/tessdata",
        "/usr/share/tessdata",
        "/usr/local/share/tessdata",
    ];

    for path in &system_paths {
        let p = PathBuf::from(path);
        if p.join("eng.traineddata").exists() {
            return Some(p);
        }
    }

    None
}
