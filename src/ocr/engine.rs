use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use image::{ImageBuffer, Luma};
use tempfile::TempDir;

use super::setup::{find_tesseract_executable, find_tessdata_dir};

/// Poll interval while waiting for the engine process to finish.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Handle to the external recognition engine.
///
/// Resolving the executable and language data and creating the scratch
/// directory is the expensive part, so it happens once and the handle is
/// reused for every recognition in a session. Dropping the handle removes
/// the scratch directory.
pub struct Engine {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
    scratch: TempDir,
}

impl Engine {
    /// Locates the engine binary and language data.
    pub fn initialize() -> Result<Self> {
        let executable = find_tesseract_executable()?;
        let tessdata = find_tessdata_dir();
        let scratch = TempDir::new().context("Failed to create engine scratch directory")?;
        crate::log(&format!(
            "Recognition engine ready: {} (tessdata: {})",
            executable.display(),
            tessdata
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string())
        ));
        Ok(Self {
            executable,
            tessdata,
            scratch,
        })
    }

    /// Runs digit-only, single-word recognition on a preprocessed grayscale
    /// image. The engine process is killed if it exceeds `timeout`.
    ///
    /// Takes `&mut self`: the scratch input file is reused between calls,
    /// so two recognitions must never run at once on the same engine.
    pub fn recognize_digits(
        &mut self,
        img: &ImageBuffer<Luma<u8>, Vec<u8>>,
        timeout: Duration,
    ) -> Result<String> {
        let input_path = self.scratch.path().join("input.png");
        img.save(&input_path)
            .context("Failed to write recognition input image")?;

        let mut cmd = Command::new(&self.executable);
        cmd.arg(&input_path)
            .arg("stdout")
            .arg("-l")
            .arg("eng")
            .arg("--psm")
            .arg("8") // Treat the image as a single word
            .arg("--oem")
            .arg("1") // LSTM engine
            .arg("-c")
            .arg("tessedit_char_whitelist=0123456789")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(tessdata) = &self.tessdata {
            cmd.arg("--tessdata-dir").arg(tessdata);
        }

        let mut child = cmd.spawn().context("Failed to start recognition engine")?;

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait()? {
                Some(_) => break,
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(anyhow!(
                        "Recognition timed out after {:.1}s",
                        timeout.as_secs_f32()
                    ));
                }
                None => std::thread::sleep(POLL_INTERVAL),
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Recognition engine failed: {}", stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
