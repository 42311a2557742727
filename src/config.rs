//! Runtime configuration.
//!
//! Loads settings from config.json at startup. Provides the storage backend
//! selection, capture device selection, and timeout bounds.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Global configuration instance, initialized once at startup.
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Record store backend: "memory", "local" (persisted files) or "remote" (HTTP API)
    #[serde(default = "default_storage_backend")]
    pub storage_backend: String,
    /// Base URL of the record API, used when storage_backend = "remote"
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Address the API server binds to for the `serve` subcommand
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Whether the seeded packaging units (카톤/중포/낱개) refuse deletion
    #[serde(default = "default_protect_default_units")]
    pub protect_default_units: bool,
    /// Capture device selector, e.g. "pattern" or "pattern:deny" for fault injection
    #[serde(default = "default_capture_device")]
    pub capture_device: String,
    /// Maximum time to wait for a still frame from the device (milliseconds)
    #[serde(default = "default_frame_timeout_ms")]
    pub frame_timeout_ms: u64,
    /// Maximum time one recognition call may take before the engine is killed (milliseconds)
    #[serde(default = "default_recognition_timeout_ms")]
    pub recognition_timeout_ms: u64,
    /// Linear contrast stretch factor applied around midpoint 128 before recognition
    #[serde(default = "default_ocr_contrast")]
    pub ocr_contrast: f32,
}

fn default_storage_backend() -> String {
    "local".to_string()
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_protect_default_units() -> bool {
    true
}

fn default_capture_device() -> String {
    "pattern".to_string()
}

fn default_frame_timeout_ms() -> u64 {
    10000
}

fn default_recognition_timeout_ms() -> u64 {
    15000
}

fn default_ocr_contrast() -> f32 {
    1.5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_backend: default_storage_backend(),
            api_base_url: default_api_base_url(),
            listen_addr: default_listen_addr(),
            protect_default_units: default_protect_default_units(),
            capture_device: default_capture_device(),
            frame_timeout_ms: default_frame_timeout_ms(),
            recognition_timeout_ms: default_recognition_timeout_ms(),
            ocr_contrast: default_ocr_contrast(),
        }
    }
}

/// Loads configuration from config.json or returns defaults.
/// Looks for config.json in the same directory as the executable.
fn load_config() -> AppConfig {
    let config_path = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("config.json")))
        .unwrap_or_else(|| Path::new("config.json").to_path_buf());

    if config_path.exists() {
        match fs::read_to_string(&config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    crate::log("Config loaded from config.json");
                    return config;
                }
                Err(e) => {
                    crate::log(&format!(
                        "Failed to parse config.json: {}. Using defaults.",
                        e
                    ));
                }
            },
            Err(e) => {
                crate::log(&format!(
                    "Failed to read config.json: {}. Using defaults.",
                    e
                ));
            }
        }
    } else {
        crate::log("config.json not found. Using default config.");
    }

    AppConfig::default()
}

/// Initializes the global configuration. Call once at startup.
pub fn init_config() {
    let _ = CONFIG.set(load_config());
}

/// Returns a reference to the global configuration.
/// Panics if called before init_config().
pub fn get_config() -> &'static AppConfig {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse_from_empty_object() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.storage_backend, "local");
        assert!(config.protect_default_units);
        assert_eq!(config.frame_timeout_ms, 10000);
        assert_eq!(config.ocr_contrast, 1.5);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"storage_backend":"memory","protect_default_units":false}"#)
                .unwrap();
        assert_eq!(config.storage_backend, "memory");
        assert!(!config.protect_default_units);
        assert_eq!(config.recognition_timeout_ms, 15000);
    }
}
