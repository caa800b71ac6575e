//! In-memory store backend. Cells keep first-write order per sheet, so a
//! read returns pairs in the order they were originally created.

use std::collections::HashMap;

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::types::{CellId, CellPair, SheetName};

use super::SsStore;

#[derive(Default)]
pub struct MemStore {
    sheets: RwLock<HashMap<String, IndexMap<CellId, String>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SsStore for MemStore {
    async fn read_formulas(&self, name: &SheetName) -> StoreResult<Vec<CellPair>> {
        let sheets = self.sheets.read().await;
        let pairs = sheets
            .get(name.as_str())
            .map(|cells| {
                cells
                    .iter()
                    .map(|(id, formula)| (id.clone(), formula.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(pairs)
    }

    async fn update_cell(
        &self,
        name: &SheetName,
        cell_id: &CellId,
        formula: &str,
    ) -> StoreResult<()> {
        let mut sheets = self.sheets.write().await;
        let cells = sheets.entry(name.as_str().to_string()).or_default();
        // IndexMap keeps the original slot when a key is overwritten, which
        // is exactly the read-order contract.
        cells.insert(cell_id.clone(), formula.to_string());
        Ok(())
    }

    async fn delete(&self, name: &SheetName, cell_id: &CellId) -> StoreResult<()> {
        let mut sheets = self.sheets.write().await;
        if let Some(cells) = sheets.get_mut(name.as_str()) {
            cells.shift_remove(cell_id);
        }
        Ok(())
    }

    async fn clear(&self, name: &SheetName) -> StoreResult<()> {
        let mut sheets = self.sheets.write().await;
        sheets.entry(name.as_str().to_string()).or_default().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(raw: &str) -> SheetName {
        SheetName::parse(raw).unwrap()
    }

    fn cell(raw: &str) -> CellId {
        CellId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn reads_return_pairs_in_first_write_order() {
        let store = MemStore::new();
        let sheet = name("s");
        store.update_cell(&sheet, &cell("b2"), "2").await.unwrap();
        store.update_cell(&sheet, &cell("a1"), "1").await.unwrap();

        let pairs = store.read_formulas(&sheet).await.unwrap();
        assert_eq!(pairs, vec![(cell("b2"), "2".into()), (cell("a1"), "1".into())]);
    }

    #[tokio::test]
    async fn overwriting_a_cell_keeps_its_position() {
        let store = MemStore::new();
        let sheet = name("s");
        store.update_cell(&sheet, &cell("a1"), "1").await.unwrap();
        store.update_cell(&sheet, &cell("b1"), "2").await.unwrap();
        store.update_cell(&sheet, &cell("a1"), "3").await.unwrap();

        let pairs = store.read_formulas(&sheet).await.unwrap();
        assert_eq!(pairs, vec![(cell("a1"), "3".into()), (cell("b1"), "2".into())]);
    }

    #[tokio::test]
    async fn deleting_absent_cell_and_clearing_empty_sheet_are_no_ops() {
        let store = MemStore::new();
        let sheet = name("empty");
        store.delete(&sheet, &cell("a1")).await.unwrap();
        store.clear(&sheet).await.unwrap();
        assert!(store.read_formulas(&sheet).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sheets_are_independent_partitions() {
        let store = MemStore::new();
        store.update_cell(&name("x"), &cell("a1"), "1").await.unwrap();
        store.update_cell(&name("y"), &cell("a1"), "2").await.unwrap();
        store.clear(&name("x")).await.unwrap();

        assert!(store.read_formulas(&name("x")).await.unwrap().is_empty());
        assert_eq!(store.read_formulas(&name("y")).await.unwrap().len(), 1);
    }
}
