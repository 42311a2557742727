//! Record types shared by every store backend.
//!
//! Validation lives here so the in-memory, file-backed and remote stores
//! (and the HTTP layer in front of them) all enforce the same rules.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Units seeded at store initialization.
pub const DEFAULT_UNIT_NAMES: [&str; 3] = ["카톤", "중포", "낱개"];

/// Longest accepted packaging unit name, in characters.
pub const MAX_UNIT_NAME_CHARS: usize = 20;

/// One captured inventory line. Never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub id: i64,
    pub product_number: String,
    pub packaging_unit: String,
    pub quantity: i64,
    pub expiration_date: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Unsaved candidate record; id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDraft {
    pub product_number: String,
    pub packaging_unit: String,
    pub quantity: i64,
    #[serde(default)]
    pub expiration_date: Option<String>,
}

/// Named bundling category (carton, middle-pack, piece, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingUnit {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Draft rejection reasons, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    #[error("product number, packaging unit and quantity are required")]
    MissingFields,
    #[error("quantity must be 1 or greater")]
    QuantityTooSmall,
    #[error("expiration date must be exactly 8 digits (YYYYMMDD)")]
    BadDateFormat,
}

static EXPIRY_RE: OnceLock<Regex> = OnceLock::new();

fn expiry_re() -> &'static Regex {
    EXPIRY_RE.get_or_init(|| Regex::new(r"^\d{8}$").expect("expiry pattern is valid"))
}

impl InventoryDraft {
    /// Checks the draft in validation order: required fields, quantity
    /// floor, then the date format.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.product_number.trim().is_empty() || self.packaging_unit.trim().is_empty() {
            return Err(DraftError::MissingFields);
        }
        if self.quantity < 1 {
            return Err(DraftError::QuantityTooSmall);
        }
        if let Some(date) = &self.expiration_date {
            if !date.is_empty() && !expiry_re().is_match(date) {
                return Err(DraftError::BadDateFormat);
            }
        }
        Ok(())
    }
}

/// Trims a candidate unit name and checks it is non-empty and within the
/// length limit. Returns the trimmed name the store should keep.
pub fn validate_unit_name(name: &str) -> Result<String, UnitNameError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(UnitNameError::Empty);
    }
    if trimmed.chars().count() > MAX_UNIT_NAME_CHARS {
        return Err(UnitNameError::TooLong);
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitNameError {
    #[error("packaging unit name is required")]
    Empty,
    #[error("packaging unit name must be at most {MAX_UNIT_NAME_CHARS} characters")]
    TooLong,
}

/// Newest-first ordering for inventory listings; id breaks timestamp ties
/// so records created within the same instant stay stable.
pub fn sort_inventory(records: &mut [InventoryRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// Name ordering for packaging unit listings.
pub fn sort_units(units: &mut [PackagingUnit]) {
    units.sort_by(|a, b| a.name.cmp(&b.name));
}
