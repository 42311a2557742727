//! Entry form: collects one inventory draft and submits it.
//!
//! Fields are kept as the raw strings the user typed. Validation runs in a
//! fixed order (required fields, quantity floor, date format) and a failed
//! submit leaves every field untouched for correction.

use thiserror::Error;

use crate::store::records::DraftError;
use crate::store::{InventoryDraft, InventoryRecord, RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] DraftError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Draft state for the data-input screen.
#[derive(Debug, Default, Clone)]
pub struct EntryForm {
    pub product_number: String,
    pub packaging_unit: String,
    pub quantity: String,
    pub expiration_date: String,
}

impl EntryForm {
    /// Form pre-filled with the recognized (or manually entered) number.
    pub fn prefill(product_number: &str) -> Self {
        Self {
            product_number: product_number.to_string(),
            ..Self::default()
        }
    }

    /// Normalizes expiration input: digits only, at most 8 of them.
    pub fn set_expiration_date(&mut self, raw: &str) {
        self.expiration_date = raw
            .chars()
            .filter(|c| c.is_ascii_digit())
            .take(8)
            .collect();
    }

    /// Builds the draft, rejecting in validation order.
    pub fn validate(&self) -> Result<InventoryDraft, DraftError> {
        if self.product_number.trim().is_empty()
            || self.packaging_unit.trim().is_empty()
            || self.quantity.trim().is_empty()
        {
            return Err(DraftError::MissingFields);
        }

        let quantity: i64 = self
            .quantity
            .trim()
            .parse()
            .map_err(|_| DraftError::QuantityTooSmall)?;

        let draft = InventoryDraft {
            product_number: self.product_number.trim().to_string(),
            packaging_unit: self.packaging_unit.clone(),
            quantity,
            expiration_date: if self.expiration_date.is_empty() {
                None
            } else {
                Some(self.expiration_date.clone())
            },
        };
        draft.validate()?;
        Ok(draft)
    }

    /// Validates and persists the draft. On success the form is cleared;
    /// on any failure the draft stays as typed.
    pub fn submit(
        &mut self,
        store: &mut dyn RecordStore,
    ) -> Result<InventoryRecord, SubmitError> {
        let draft = self.validate()?;
        let record = store.add_inventory(draft)?;
        *self = Self::default();
        Ok(record)
    }
}
