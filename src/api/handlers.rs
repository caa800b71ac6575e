//! Route handlers for the store REST service.
//!
//! Every request body is validated against its schema before any store call
//! runs, so bad input never causes a partial mutation. Array bodies are then
//! applied pair by pair in order; a failure partway leaves earlier pairs
//! applied and surfaces the triggering error.

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::error::{codes, ErrorEnvelope, StoreError};
use crate::store;
use crate::types::{CellId, CellPair, Command, SheetName};

use super::server::AppState;

const SHEET_BODY_MSG: &str = "request body must be a list of cellId, formula pairs";
const FORMULA_BODY_MSG: &str = "request body must be a { formula } object";

//==============================================================================
// Error mapping
//==============================================================================

/// Domain-code -> HTTP-status table. Codes without an entry degrade to 400,
/// so by default every domain error is a bad request; deployments wanting,
/// say, a 404 for a missing-sheet code register it here.
#[derive(Debug, Clone, Default)]
pub struct DomainStatusMap(HashMap<String, StatusCode>);

impl DomainStatusMap {
    pub fn with(mut self, code: impl Into<String>, status: StatusCode) -> Self {
        self.0.insert(code.into(), status);
        self
    }

    pub fn status_for(&self, code: &str) -> StatusCode {
        self.0.get(code).copied().unwrap_or(StatusCode::BAD_REQUEST)
    }
}

/// A failed request, rendered as the wire envelope
/// `{status, error: {code, message}}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    envelope: ErrorEnvelope,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            envelope: ErrorEnvelope::new(status.as_u16(), code, message),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message)
    }

    /// Map a store failure per the error taxonomy: domain errors keep their
    /// code and take their status from the table; anything else is logged
    /// server-side and surfaced as a 500 with only its message.
    pub fn from_store(state: &AppState, err: StoreError) -> Self {
        match err {
            // The backing store is itself a store service; re-surface its
            // structured error unchanged.
            StoreError::Remote(envelope) => {
                let status = StatusCode::from_u16(envelope.status)
                    .unwrap_or(StatusCode::BAD_REQUEST);
                Self { status, envelope }
            }
            err if err.is_domain() => {
                let status = state.statuses.status_for(err.code());
                Self::new(status, err.code(), err.message())
            }
            err => {
                tracing::error!("store service failure: {err}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    codes::SERVER_ERROR,
                    err.message(),
                )
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn envelope(&self) -> &ErrorEnvelope {
        &self.envelope
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

//==============================================================================
// Handlers
//==============================================================================

/// GET /api/store/{spreadSheetName}
pub async fn read_sheet(
    State(state): State<AppState>,
    Path(raw_name): Path<String>,
) -> Result<Json<Vec<CellPair>>, ApiError> {
    let name = sheet_param(&raw_name)?;
    let pairs = state
        .store
        .read_formulas(&name)
        .await
        .map_err(|e| ApiError::from_store(&state, e))?;
    Ok(Json(pairs))
}

/// PUT /api/store/{spreadSheetName} replaces: clear, then apply pairs in order.
pub async fn replace_sheet(
    State(state): State<AppState>,
    Path(raw_name): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let name = sheet_param(&raw_name)?;
    let pairs = sheet_body(body)?;
    store::apply(state.store.as_ref(), &name, &Command::ReplaceAll { pairs })
        .await
        .map_err(|e| ApiError::from_store(&state, e))?;
    Ok(StatusCode::CREATED)
}

/// PATCH /api/store/{spreadSheetName} updates: apply pairs in order, no clear.
pub async fn update_sheet(
    State(state): State<AppState>,
    Path(raw_name): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let name = sheet_param(&raw_name)?;
    let pairs = sheet_body(body)?;
    for (cell_id, formula) in pairs {
        store::apply(
            state.store.as_ref(),
            &name,
            &Command::UpdateCell { cell_id, formula },
        )
        .await
        .map_err(|e| ApiError::from_store(&state, e))?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/store/{spreadSheetName}
pub async fn clear_sheet(
    State(state): State<AppState>,
    Path(raw_name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let name = sheet_param(&raw_name)?;
    store::apply(state.store.as_ref(), &name, &Command::ClearAll)
        .await
        .map_err(|e| ApiError::from_store(&state, e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/store/{spreadSheetName}/{cellId} replaces the cell: delete, then set.
pub async fn replace_cell(
    State(state): State<AppState>,
    Path((raw_name, raw_cell)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let name = sheet_param(&raw_name)?;
    let cell_id = cell_param(&raw_cell)?;
    let formula = formula_body(body)?;
    store::apply(
        state.store.as_ref(),
        &name,
        &Command::DeleteCell { cell_id: cell_id.clone() },
    )
    .await
    .map_err(|e| ApiError::from_store(&state, e))?;
    store::apply(state.store.as_ref(), &name, &Command::UpdateCell { cell_id, formula })
        .await
        .map_err(|e| ApiError::from_store(&state, e))?;
    Ok(StatusCode::CREATED)
}

/// PATCH /api/store/{spreadSheetName}/{cellId} sets the cell, creating if absent.
pub async fn update_cell(
    State(state): State<AppState>,
    Path((raw_name, raw_cell)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let name = sheet_param(&raw_name)?;
    let cell_id = cell_param(&raw_cell)?;
    let formula = formula_body(body)?;
    store::apply(state.store.as_ref(), &name, &Command::UpdateCell { cell_id, formula })
        .await
        .map_err(|e| ApiError::from_store(&state, e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/store/{spreadSheetName}/{cellId}
pub async fn delete_cell(
    State(state): State<AppState>,
    Path((raw_name, raw_cell)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let name = sheet_param(&raw_name)?;
    let cell_id = cell_param(&raw_cell)?;
    store::apply(state.store.as_ref(), &name, &Command::DeleteCell { cell_id })
        .await
        .map_err(|e| ApiError::from_store(&state, e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Catch-all for any method/path with no route.
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::new(
        StatusCode::NOT_FOUND,
        codes::NOT_FOUND,
        format!("{method} not supported for {uri}"),
    )
}

//==============================================================================
// Request schemas
//==============================================================================

fn sheet_param(raw: &str) -> Result<SheetName, ApiError> {
    SheetName::parse(raw).map_err(|e| ApiError::bad_request(e.message()))
}

fn cell_param(raw: &str) -> Result<CellId, ApiError> {
    CellId::parse(raw).map_err(|e| ApiError::bad_request(e.message()))
}

/// Whole-sheet body: an array where every element is a `[cellId, formula]`
/// two-element array of strings.
fn sheet_body(body: Result<Json<Value>, JsonRejection>) -> Result<Vec<CellPair>, ApiError> {
    let Json(value) = body.map_err(|_| ApiError::bad_request(SHEET_BODY_MSG))?;
    let items = value
        .as_array()
        .ok_or_else(|| ApiError::bad_request(SHEET_BODY_MSG))?;

    let mut pairs = Vec::with_capacity(items.len());
    for item in items {
        let pair = item
            .as_array()
            .filter(|p| p.len() == 2)
            .ok_or_else(|| ApiError::bad_request(SHEET_BODY_MSG))?;
        let (raw_cell, formula) = match (pair[0].as_str(), pair[1].as_str()) {
            (Some(c), Some(f)) => (c, f),
            _ => return Err(ApiError::bad_request(SHEET_BODY_MSG)),
        };
        pairs.push((cell_param(raw_cell)?, formula.to_string()));
    }
    Ok(pairs)
}

/// Single-cell body: an object with exactly one key, `formula`, whose value
/// is a non-empty string.
fn formula_body(body: Result<Json<Value>, JsonRejection>) -> Result<String, ApiError> {
    let Json(value) = body.map_err(|_| ApiError::bad_request(FORMULA_BODY_MSG))?;
    let object = value
        .as_object()
        .filter(|o| o.len() == 1)
        .ok_or_else(|| ApiError::bad_request(FORMULA_BODY_MSG))?;
    match object.get("formula").and_then(Value::as_str) {
        Some(formula) if !formula.is_empty() => Ok(formula.to_string()),
        _ => Err(ApiError::bad_request(FORMULA_BODY_MSG)),
    }
}
