//! File-persisted record store.
//!
//! Both record kinds are kept as serialized JSON arrays under fixed file
//! names, loaded once at startup and rewritten on every mutation. Stored
//! data that fails to parse is logged and treated as empty rather than
//! blocking startup.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::records::{
    sort_inventory, sort_units, validate_unit_name, InventoryDraft, InventoryRecord,
    PackagingUnit, DEFAULT_UNIT_NAMES,
};
use super::{RecordStore, StoreError};

const INVENTORY_FILE: &str = "inventory_items.json";
const UNITS_FILE: &str = "packaging_units.json";

/// Store persisting to two JSON files in `dir`.
pub struct LocalStore {
    dir: PathBuf,
    items: Vec<InventoryRecord>,
    units: Vec<PackagingUnit>,
    protect_defaults: bool,
}

impl LocalStore {
    /// Loads both record files, seeding the default packaging units when
    /// no units file exists yet.
    pub fn open(dir: &Path, protect_defaults: bool) -> Self {
        let mut store = Self {
            dir: dir.to_path_buf(),
            items: read_records(&dir.join(INVENTORY_FILE)),
            units: read_records(&dir.join(UNITS_FILE)),
            protect_defaults,
        };

        if store.units.is_empty() {
            store.units = DEFAULT_UNIT_NAMES
                .iter()
                .enumerate()
                .map(|(i, name)| PackagingUnit {
                    id: i as i64 + 1,
                    name: name.to_string(),
                    created_at: Utc::now(),
                })
                .collect();
            if let Err(e) = store.persist_units() {
                crate::log(&format!("Failed to seed packaging units: {}", e));
            }
        }

        store
    }

    fn next_item_id(&self) -> i64 {
        self.items.iter().map(|r| r.id).max().unwrap_or(0) + 1
    }

    fn next_unit_id(&self) -> i64 {
        self.units.iter().map(|u| u.id).max().unwrap_or(0) + 1
    }

    fn persist_items(&self) -> anyhow::Result<()> {
        write_records(&self.dir.join(INVENTORY_FILE), &self.items)
    }

    fn persist_units(&self) -> anyhow::Result<()> {
        write_records(&self.dir.join(UNITS_FILE), &self.units)
    }
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    if !path.exists() {
        return Vec::new();
    }
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(records) => records,
            Err(e) => {
                crate::log(&format!(
                    "Corrupt record file {}: {}. Treating as empty.",
                    path.display(),
                    e
                ));
                Vec::new()
            }
        },
        Err(e) => {
            crate::log(&format!(
                "Failed to read {}: {}. Treating as empty.",
                path.display(),
                e
            ));
            Vec::new()
        }
    }
}

fn write_records<T: Serialize>(path: &Path, records: &[T]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    Ok(())
}

impl RecordStore for LocalStore {
    fn inventory(&mut self) -> Result<Vec<InventoryRecord>, StoreError> {
        let mut records = self.items.clone();
        sort_inventory(&mut records);
        Ok(records)
    }

    fn add_inventory(&mut self, draft: InventoryDraft) -> Result<InventoryRecord, StoreError> {
        draft.validate()?;
        let record = InventoryRecord {
            id: self.next_item_id(),
            product_number: draft.product_number.trim().to_string(),
            packaging_unit: draft.packaging_unit,
            quantity: draft.quantity,
            expiration_date: draft.expiration_date.filter(|d| !d.is_empty()),
            created_at: Utc::now(),
        };
        self.items.push(record.clone());
        self.persist_items().map_err(StoreError::Save)?;
        Ok(record)
    }

    fn delete_inventory(&mut self, id: i64) -> Result<(), StoreError> {
        let before = self.items.len();
        self.items.retain(|r| r.id != id);
        if self.items.len() != before {
            self.persist_items().map_err(StoreError::Delete)?;
        }
        Ok(())
    }

    fn clear_inventory(&mut self) -> Result<(), StoreError> {
        self.items.clear();
        self.persist_items().map_err(StoreError::Delete)?;
        Ok(())
    }

    fn packaging_units(&mut self) -> Result<Vec<PackagingUnit>, StoreError> {
        let mut units = self.units.clone();
        sort_units(&mut units);
        Ok(units)
    }

    fn add_packaging_unit(&mut self, name: &str) -> Result<PackagingUnit, StoreError> {
        let name = validate_unit_name(name)?;
        if self.units.iter().any(|u| u.name == name) {
            return Err(StoreError::DuplicateUnit(name));
        }
        let unit = PackagingUnit {
            id: self.next_unit_id(),
            name,
            created_at: Utc::now(),
        };
        self.units.push(unit.clone());
        self.persist_units().map_err(StoreError::Save)?;
        Ok(unit)
    }

    fn delete_packaging_unit(&mut self, id: i64) -> Result<(), StoreError> {
        let Some(unit) = self.units.iter().find(|u| u.id == id) else {
            return Ok(());
        };
        if self.protect_defaults && DEFAULT_UNIT_NAMES.contains(&unit.name.as_str()) {
            return Err(StoreError::ProtectedUnit);
        }
        self.units.retain(|u| u.id != id);
        self.persist_units().map_err(StoreError::Delete)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn draft(product_number: &str) -> InventoryDraft {
        InventoryDraft {
            product_number: product_number.to_string(),
            packaging_unit: "낱개".to_string(),
            quantity: 2,
            expiration_date: Some("20251201".to_string()),
        }
    }

    #[test]
    fn test_open_seeds_defaults_and_writes_file() {
        let dir = tempdir().unwrap();
        let mut store = LocalStore::open(dir.path(), true);

        assert_eq!(store.packaging_units().unwrap().len(), 3);
        assert!(dir.path().join(UNITS_FILE).exists());
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let mut store = LocalStore::open(dir.path(), true);
            store.add_inventory(draft("8801234567")).unwrap();
            store.add_packaging_unit("박스").unwrap();
        }

        let mut reopened = LocalStore::open(dir.path(), true);
        let items = reopened.inventory().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_number, "8801234567");
        assert_eq!(items[0].expiration_date.as_deref(), Some("20251201"));
        assert_eq!(reopened.packaging_units().unwrap().len(), 4);
    }

    #[test]
    fn test_ids_keep_growing_after_reopen() {
        let dir = tempdir().unwrap();
        let first_id = {
            let mut store = LocalStore::open(dir.path(), true);
            store.add_inventory(draft("1111")).unwrap().id
        };

        let mut reopened = LocalStore::open(dir.path(), true);
        let second_id = reopened.add_inventory(draft("2222")).unwrap().id;
        assert!(second_id > first_id);
    }

    #[test]
    fn test_corrupt_file_treated_as_empty() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(INVENTORY_FILE), "{not json").unwrap();

        let mut store = LocalStore::open(dir.path(), true);
        assert!(store.inventory().unwrap().is_empty());

        // The store stays usable and overwrites the bad file on mutation.
        store.add_inventory(draft("1234")).unwrap();
        let mut reopened = LocalStore::open(dir.path(), true);
        assert_eq!(reopened.inventory().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let dir = tempdir().unwrap();
        let mut store = LocalStore::open(dir.path(), true);
        store.delete_inventory(42).unwrap();
    }

    #[test]
    fn test_duplicate_unit_rejected_across_restart() {
        let dir = tempdir().unwrap();
        {
            let mut store = LocalStore::open(dir.path(), true);
            store.add_packaging_unit("박스").unwrap();
        }
        let mut reopened = LocalStore::open(dir.path(), true);
        assert!(matches!(
            reopened.add_packaging_unit("박스"),
            Err(StoreError::DuplicateUnit(_))
        ));
    }
}
