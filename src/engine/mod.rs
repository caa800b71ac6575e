//! Evaluation-engine contract consumed by the update controllers.
//!
//! Formula interpretation belongs to the engine, not to this crate's sync
//! protocol: the [`Evaluator`] seam is where a real formula grammar (with
//! reference resolution and cycle detection) plugs in. The crate ships a
//! numeric-literal evaluator so the surfaces run end-to-end without one.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::types::{CellId, CellPair, CellRecord, Command, SheetName};

pub mod local;

pub use local::LocalSheet;

/// One open spreadsheet with evaluated values. Mutating calls write through
/// to the backing store before any cached state changes, so a mutation
/// either fully applies or does not start.
#[async_trait]
pub trait Engine: Send + Sync {
    fn name(&self) -> &SheetName;

    /// Parse and store a formula for a cell. Fails with a syntax or
    /// circular-reference domain error, leaving the cell untouched.
    async fn eval(&self, cell_id: &CellId, formula: &str) -> StoreResult<()>;

    /// Duplicate the source cell's formula into `dest`. Copying from a cell
    /// with no formula removes the destination.
    async fn copy(&self, dest: &CellId, src: &CellId) -> StoreResult<()>;

    async fn delete(&self, cell_id: &CellId) -> StoreResult<()>;

    async fn clear(&self) -> StoreResult<()>;

    /// Formula and evaluated value of one cell; empty record if the cell is
    /// not set.
    fn query(&self, cell_id: &CellId) -> CellRecord;

    /// All `[cellId, formula]` pairs in first-write order.
    fn dump(&self) -> Vec<CellPair>;

    /// Mapping of every set cell to its record.
    fn value_formulas(&self) -> HashMap<CellId, CellRecord>;
}

/// Dispatch one validated [`Command`] to the engine.
pub async fn apply(engine: &dyn Engine, command: &Command) -> StoreResult<()> {
    match command {
        Command::UpdateCell { cell_id, formula } => engine.eval(cell_id, formula).await,
        Command::DeleteCell { cell_id } => engine.delete(cell_id).await,
        Command::ClearAll => engine.clear().await,
        Command::CopyCell { dest, src } => engine.copy(dest, src).await,
        Command::ReplaceAll { pairs } => {
            engine.clear().await?;
            for (cell_id, formula) in pairs {
                engine.eval(cell_id, formula).await?;
            }
            Ok(())
        }
    }
}

/// Computes display values from formulas. Implementations own the formula
/// grammar; this crate never inspects formula contents elsewhere.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, formula: &str) -> StoreResult<String>;
}

/// Evaluator accepting numeric literals only. Anything that does not parse
/// as a number is a syntax error.
pub struct LiteralEvaluator;

impl Evaluator for LiteralEvaluator {
    fn evaluate(&self, formula: &str) -> StoreResult<String> {
        let trimmed = formula.trim();
        if trimmed.is_empty() {
            return Err(StoreError::Syntax("empty formula".to_string()));
        }
        let number: f64 = trimmed
            .parse()
            .map_err(|_| StoreError::Syntax(format!("cannot parse \"{trimmed}\" as a number")))?;
        if number.fract() == 0.0 && number.abs() < 1e15 {
            Ok(format!("{}", number as i64))
        } else {
            Ok(number.to_string())
        }
    }
}
