//! In-memory record store.

use std::collections::HashMap;

use chrono::Utc;

use super::records::{
    sort_inventory, sort_units, validate_unit_name, InventoryDraft, InventoryRecord,
    PackagingUnit, DEFAULT_UNIT_NAMES,
};
use super::{RecordStore, StoreError};

/// Map-backed store; contents live for the process lifetime only.
pub struct MemStore {
    items: HashMap<i64, InventoryRecord>,
    units: HashMap<i64, PackagingUnit>,
    next_item_id: i64,
    next_unit_id: i64,
    protect_defaults: bool,
}

impl MemStore {
    pub fn new(protect_defaults: bool) -> Self {
        let mut store = Self {
            items: HashMap::new(),
            units: HashMap::new(),
            next_item_id: 1,
            next_unit_id: 1,
            protect_defaults,
        };
        for name in DEFAULT_UNIT_NAMES {
            let id = store.next_unit_id;
            store.next_unit_id += 1;
            store.units.insert(
                id,
                PackagingUnit {
                    id,
                    name: name.to_string(),
                    created_at: Utc::now(),
                },
            );
        }
        store
    }
}

impl RecordStore for MemStore {
    fn inventory(&mut self) -> Result<Vec<InventoryRecord>, StoreError> {
        let mut records: Vec<_> = self.items.values().cloned().collect();
        sort_inventory(&mut records);
        Ok(records)
    }

    fn add_inventory(&mut self, draft: InventoryDraft) -> Result<InventoryRecord, StoreError> {
        draft.validate()?;
        let id = self.next_item_id;
        self.next_item_id += 1;
        let record = InventoryRecord {
            id,
            product_number: draft.product_number.trim().to_string(),
            packaging_unit: draft.packaging_unit,
            quantity: draft.quantity,
            expiration_date: draft.expiration_date.filter(|d| !d.is_empty()),
            created_at: Utc::now(),
        };
        self.items.insert(id, record.clone());
        Ok(record)
    }

    fn delete_inventory(&mut self, id: i64) -> Result<(), StoreError> {
        self.items.remove(&id);
        Ok(())
    }

    fn clear_inventory(&mut self) -> Result<(), StoreError> {
        self.items.clear();
        Ok(())
    }

    fn packaging_units(&mut self) -> Result<Vec<PackagingUnit>, StoreError> {
        let mut units: Vec<_> = self.units.values().cloned().collect();
        sort_units(&mut units);
        Ok(units)
    }

    fn add_packaging_unit(&mut self, name: &str) -> Result<PackagingUnit, StoreError> {
        let name = validate_unit_name(name)?;
        if self.units.values().any(|u| u.name == name) {
            return Err(StoreError::DuplicateUnit(name));
        }
        let id = self.next_unit_id;
        self.next_unit_id += 1;
        let unit = PackagingUnit {
            id,
            name,
            created_at: Utc::now(),
        };
        self.units.insert(id, unit.clone());
        Ok(unit)
    }

    fn delete_packaging_unit(&mut self, id: i64) -> Result<(), StoreError> {
        let Some(unit) = self.units.get(&id) else {
            return Ok(());
        };
        if self.protect_defaults && DEFAULT_UNIT_NAMES.contains(&unit.name.as_str()) {
            return Err(StoreError::ProtectedUnit);
        }
        self.units.remove(&id);
        Ok(())
    }
}
