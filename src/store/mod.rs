//! Record storage.
//!
//! One `RecordStore` interface with three backends selected at startup:
//! an in-memory map, a file-persisted list, and a client for the HTTP API.
//! Validation is shared through `records`, so a draft rejected by one
//! backend is rejected identically by the others.

pub mod local;
pub mod memory;
pub mod records;
pub mod remote;

use anyhow::{anyhow, Result};
use thiserror::Error;

pub use local::LocalStore;
pub use memory::MemStore;
pub use records::{
    DraftError, InventoryDraft, InventoryRecord, PackagingUnit, UnitNameError,
};
pub use remote::RemoteStore;

/// Store operation failures. The load/save/delete variants deliberately
/// carry the same user-facing wording apart from the operation name.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    InvalidDraft(#[from] DraftError),
    #[error(transparent)]
    InvalidUnitName(#[from] UnitNameError),
    #[error("a packaging unit named \"{0}\" already exists")]
    DuplicateUnit(String),
    #[error("default packaging units cannot be deleted")]
    ProtectedUnit,
    #[error("failed to load records, please retry")]
    Load(#[source] anyhow::Error),
    #[error("failed to save, please retry")]
    Save(#[source] anyhow::Error),
    #[error("failed to delete, please retry")]
    Delete(#[source] anyhow::Error),
}

/// Append/list/delete over the two record kinds. No update operation
/// exists for either kind.
pub trait RecordStore: Send {
    /// Inventory records, newest first.
    fn inventory(&mut self) -> Result<Vec<InventoryRecord>, StoreError>;

    /// Validates the draft, assigns id and creation time, and appends.
    fn add_inventory(&mut self, draft: InventoryDraft) -> Result<InventoryRecord, StoreError>;

    /// Removes one record. Deleting an unknown id is a no-op.
    fn delete_inventory(&mut self, id: i64) -> Result<(), StoreError>;

    /// Removes every inventory record.
    fn clear_inventory(&mut self) -> Result<(), StoreError>;

    /// Packaging units ordered by name.
    fn packaging_units(&mut self) -> Result<Vec<PackagingUnit>, StoreError>;

    /// Adds a unit after trimming and uniqueness checks.
    fn add_packaging_unit(&mut self, name: &str) -> Result<PackagingUnit, StoreError>;

    /// Removes one unit. Unknown ids are a no-op; seeded defaults refuse
    /// deletion when the store was opened with protection on.
    fn delete_packaging_unit(&mut self, id: i64) -> Result<(), StoreError>;
}

/// Opens the backend named in the configuration.
pub fn open_backend(config: &crate::config::AppConfig) -> Result<Box<dyn RecordStore>> {
    match config.storage_backend.as_str() {
        "memory" => Ok(Box::new(MemStore::new(config.protect_default_units))),
        "local" => Ok(Box::new(LocalStore::open(
            &crate::paths::get_store_dir(),
            config.protect_default_units,
        ))),
        "remote" => Ok(Box::new(RemoteStore::new(&config.api_base_url)?)),
        other => Err(anyhow!("Unknown storage backend: {}", other)),
    }
}
