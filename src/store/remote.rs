//! Remote record store: a client for the HTTP API surface.
//!
//! Drafts and unit names are validated locally through the shared rules
//! before anything goes on the wire, so the remote backend rejects exactly
//! what the local ones do. Network failures surface as the per-operation
//! retry errors; no automatic retry happens here.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;

use super::records::{validate_unit_name, InventoryDraft, InventoryRecord, PackagingUnit};
use super::{RecordStore, StoreError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client over the record API.
pub struct RemoteStore {
    base_url: String,
    client: Client,
}

impl RemoteStore {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Reads the `error` code out of a JSON error body, if there is one.
fn error_code(response: Response) -> Option<String> {
    let body: serde_json::Value = response.json().ok()?;
    body.get("error")?.as_str().map(str::to_string)
}

impl RecordStore for RemoteStore {
    fn inventory(&mut self) -> Result<Vec<InventoryRecord>, StoreError> {
        let response = self
            .client
            .get(self.url("/api/inventory"))
            .send()
            .map_err(|e| StoreError::Load(e.into()))?;
        if !response.status().is_success() {
            return Err(StoreError::Load(anyhow!("HTTP {}", response.status())));
        }
        response.json().map_err(|e| StoreError::Load(e.into()))
    }

    fn add_inventory(&mut self, draft: InventoryDraft) -> Result<InventoryRecord, StoreError> {
        draft.validate()?;
        let response = self
            .client
            .post(self.url("/api/inventory"))
            .json(&draft)
            .send()
            .map_err(|e| StoreError::Save(e.into()))?;
        if response.status() != StatusCode::CREATED {
            return Err(StoreError::Save(anyhow!("HTTP {}", response.status())));
        }
        response.json().map_err(|e| StoreError::Save(e.into()))
    }

    fn delete_inventory(&mut self, id: i64) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/inventory/{}", id)))
            .send()
            .map_err(|e| StoreError::Delete(e.into()))?;
        if !response.status().is_success() {
            return Err(StoreError::Delete(anyhow!("HTTP {}", response.status())));
        }
        Ok(())
    }

    fn clear_inventory(&mut self) -> Result<(), StoreError> {
        for record in self.inventory().map_err(|_| {
            StoreError::Delete(anyhow!("could not list records before clearing"))
        })? {
            self.delete_inventory(record.id)?;
        }
        Ok(())
    }

    fn packaging_units(&mut self) -> Result<Vec<PackagingUnit>, StoreError> {
        let response = self
            .client
            .get(self.url("/api/packaging-units"))
            .send()
            .map_err(|e| StoreError::Load(e.into()))?;
        if !response.status().is_success() {
            return Err(StoreError::Load(anyhow!("HTTP {}", response.status())));
        }
        response.json().map_err(|e| StoreError::Load(e.into()))
    }

    fn add_packaging_unit(&mut self, name: &str) -> Result<PackagingUnit, StoreError> {
        let name = validate_unit_name(name)?;
        let response = self
            .client
            .post(self.url("/api/packaging-units"))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .map_err(|e| StoreError::Save(e.into()))?;

        let status = response.status();
        if status == StatusCode::CREATED {
            return response.json().map_err(|e| StoreError::Save(e.into()));
        }
        if status == StatusCode::BAD_REQUEST
            && error_code(response).as_deref() == Some("duplicate_unit")
        {
            return Err(StoreError::DuplicateUnit(name));
        }
        Err(StoreError::Save(anyhow!("HTTP {}", status)))
    }

    fn delete_packaging_unit(&mut self, id: i64) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/packaging-units/{}", id)))
            .send()
            .map_err(|e| StoreError::Delete(e.into()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::BAD_REQUEST
            && error_code(response).as_deref() == Some("protected_unit")
        {
            return Err(StoreError::ProtectedUnit);
        }
        Err(StoreError::Delete(anyhow!("HTTP {}", status)))
    }
}
