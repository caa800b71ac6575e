//! Typed wrapper over the store REST service.
//!
//! If a call fails and the response carries the structured error shape
//! `{status, error: {code, message}}`, that shape is re-surfaced unchanged
//! so callers can branch on `error.code`; otherwise the original transport
//! error propagates unmodified.

use async_trait::async_trait;

use crate::error::{ErrorEnvelope, StoreError, StoreResult};
use crate::store::SsStore;
use crate::types::{CellId, CellPair, SheetName};

const BASE: &str = "/api/store";

pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl StoreClient {
    /// `base_url` is the service origin, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn sheet_url(&self, name: &SheetName) -> String {
        format!("{}{}/{}", self.base_url, BASE, name)
    }

    fn cell_url(&self, name: &SheetName, cell_id: &CellId) -> String {
        format!("{}{}/{}/{}", self.base_url, BASE, name, cell_id)
    }

    /// Return the `[cellId, formula]` pairs of the sheet.
    pub async fn read_formulas(&self, name: &SheetName) -> StoreResult<Vec<CellPair>> {
        let response = self.http.get(self.sheet_url(name)).send().await?;
        let response = rethrow(response).await?;
        Ok(response.json().await?)
    }

    /// Update `cell_id` of the sheet to contain `formula`.
    pub async fn update_cell(
        &self,
        name: &SheetName,
        cell_id: &CellId,
        formula: &str,
    ) -> StoreResult<()> {
        let response = self
            .http
            .patch(self.cell_url(name, cell_id))
            .json(&serde_json::json!({ "formula": formula }))
            .send()
            .await?;
        rethrow(response).await?;
        Ok(())
    }

    /// Remove all info for `cell_id` from the sheet.
    pub async fn delete(&self, name: &SheetName, cell_id: &CellId) -> StoreResult<()> {
        let response = self.http.delete(self.cell_url(name, cell_id)).send().await?;
        rethrow(response).await?;
        Ok(())
    }

    /// Clear the contents of the sheet.
    pub async fn clear(&self, name: &SheetName) -> StoreResult<()> {
        let response = self.http.delete(self.sheet_url(name)).send().await?;
        rethrow(response).await?;
        Ok(())
    }
}

/// Normalize a failed response: a parseable domain envelope is re-surfaced
/// as-is, anything else keeps the original transport error.
async fn rethrow(response: reqwest::Response) -> StoreResult<reqwest::Response> {
    let Some(status_error) = response.error_for_status_ref().err() else {
        return Ok(response);
    };
    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => Err(StoreError::Remote(envelope)),
        Err(_) => Err(StoreError::Transport(status_error)),
    }
}

/// The client is itself a store, so an engine can be built directly over
/// the remote service.
#[async_trait]
impl SsStore for StoreClient {
    async fn read_formulas(&self, name: &SheetName) -> StoreResult<Vec<CellPair>> {
        StoreClient::read_formulas(self, name).await
    }

    async fn update_cell(
        &self,
        name: &SheetName,
        cell_id: &CellId,
        formula: &str,
    ) -> StoreResult<()> {
        StoreClient::update_cell(self, name, cell_id, formula).await
    }

    async fn delete(&self, name: &SheetName, cell_id: &CellId) -> StoreResult<()> {
        StoreClient::delete(self, name, cell_id).await
    }

    async fn clear(&self, name: &SheetName) -> StoreResult<()> {
        StoreClient::clear(self, name).await
    }
}
