use std::path::PathBuf;
use std::sync::OnceLock;

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the per-user data directory: `<data_local_dir>/labelsnap/`
pub fn get_data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("labelsnap")
    })
}

/// Returns the logs directory: `<data_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_data_dir().join("logs")
}

/// Returns the directory holding the persisted record files: `<data_dir>/store/`
pub fn get_store_dir() -> PathBuf {
    get_data_dir().join("store")
}

/// Returns the directory export files are written to: `<data_dir>/exports/`
pub fn get_exports_dir() -> PathBuf {
    get_data_dir().join("exports")
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    std::fs::create_dir_all(get_store_dir())?;
    std::fs::create_dir_all(get_exports_dir())?;
    Ok(())
}
