//! Sheetstore - shared spreadsheet store with a REST synchronization protocol
//!
//! This library exposes one mutable store of named spreadsheets to three
//! client surfaces: a pure REST API, a server-rendered form UI, and a
//! reactive session controller. The store protocol distinguishes replace
//! (PUT: clear the scope, then apply) from update (PATCH: merge into the
//! scope), validates request shapes before any mutation, and applies array
//! bodies strictly in order with no transaction across pairs.
//!
//! Formula evaluation is delegated through the [`engine::Evaluator`] seam;
//! the crate ships a numeric-literal evaluator so every surface runs
//! end-to-end without an external engine.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sheetstore::api::{run_api_server, ApiConfig};
//! use sheetstore::store::MemStore;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let store = Arc::new(MemStore::new());
//! run_api_server(ApiConfig::default(), store).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod engine;
pub mod error;
pub mod reactive;
pub mod store;
pub mod types;
pub mod validate;
pub mod web;

// Re-export commonly used types
pub use error::{ErrorEnvelope, StoreError, StoreResult};
pub use types::{CellId, CellRecord, Command, SheetName};
