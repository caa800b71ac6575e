//! Persistent-store contract and the command-to-mutation mapping.
//!
//! The store is the sole serialization point: each call is atomic, but a
//! multi-pair command is applied as independent calls in order with no
//! transaction around them.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{CellId, CellPair, Command, SheetName};

pub mod memory;

pub use memory::MemStore;

/// Backend holding the cells of named spreadsheets. Implementations report
/// backend failures as domain errors; callers never see store internals.
#[async_trait]
pub trait SsStore: Send + Sync {
    /// All `[cellId, formula]` pairs of the sheet, in first-write order.
    async fn read_formulas(&self, name: &SheetName) -> StoreResult<Vec<CellPair>>;

    /// Set `cell_id` to `formula`, creating the cell (and sheet) if absent.
    async fn update_cell(
        &self,
        name: &SheetName,
        cell_id: &CellId,
        formula: &str,
    ) -> StoreResult<()>;

    /// Remove one cell. Removing an absent cell is a no-op.
    async fn delete(&self, name: &SheetName, cell_id: &CellId) -> StoreResult<()>;

    /// Remove every cell of the sheet, keeping the name.
    async fn clear(&self, name: &SheetName) -> StoreResult<()>;
}

/// Apply one [`Command`] as a sequence of store calls.
///
/// Multi-pair commands apply pairs strictly in order; a failure partway
/// leaves the already-applied pairs in place, aborts the rest and surfaces
/// the triggering error.
pub async fn apply(store: &dyn SsStore, name: &SheetName, command: &Command) -> StoreResult<()> {
    match command {
        Command::UpdateCell { cell_id, formula } => {
            store.update_cell(name, cell_id, formula).await
        }
        Command::DeleteCell { cell_id } => store.delete(name, cell_id).await,
        Command::ClearAll => store.clear(name).await,
        Command::ReplaceAll { pairs } => {
            store.clear(name).await?;
            for (cell_id, formula) in pairs {
                store.update_cell(name, cell_id, formula).await?;
            }
            Ok(())
        }
        Command::CopyCell { dest, src } => {
            let source_formula = store
                .read_formulas(name)
                .await?
                .into_iter()
                .find(|(id, _)| id == src)
                .map(|(_, formula)| formula);
            match source_formula {
                Some(formula) => store.update_cell(name, dest, &formula).await,
                // Copying from an empty cell removes the destination.
                None => store.delete(name, dest).await,
            }
        }
    }
}
