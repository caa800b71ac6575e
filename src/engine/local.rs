//! Store-backed engine: cells cached in memory, every mutation written
//! through to the [`SsStore`] before the cache changes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::StoreResult;
use crate::store::SsStore;
use crate::types::{CellId, CellPair, CellRecord, SheetName};

use super::{Engine, Evaluator, LiteralEvaluator};

pub struct LocalSheet {
    name: SheetName,
    store: Arc<dyn SsStore>,
    evaluator: Box<dyn Evaluator>,
    cells: RwLock<IndexMap<CellId, String>>,
}

impl LocalSheet {
    /// Async factory: loads the sheet's current formulas from the store.
    pub async fn make(name: SheetName, store: Arc<dyn SsStore>) -> StoreResult<Self> {
        Self::with_evaluator(name, store, Box::new(LiteralEvaluator)).await
    }

    pub async fn with_evaluator(
        name: SheetName,
        store: Arc<dyn SsStore>,
        evaluator: Box<dyn Evaluator>,
    ) -> StoreResult<Self> {
        let pairs = store.read_formulas(&name).await?;
        let cells = pairs.into_iter().collect();
        Ok(Self {
            name,
            store,
            evaluator,
            cells: RwLock::new(cells),
        })
    }

    fn record(&self, formula: &str) -> CellRecord {
        CellRecord {
            formula: formula.to_string(),
            // Stored formulas passed eval, but cells written through the
            // REST surface bypass it; show no value for those.
            value: self.evaluator.evaluate(formula).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl Engine for LocalSheet {
    fn name(&self) -> &SheetName {
        &self.name
    }

    async fn eval(&self, cell_id: &CellId, formula: &str) -> StoreResult<()> {
        self.evaluator.evaluate(formula)?;
        self.store.update_cell(&self.name, cell_id, formula).await?;
        let mut cells = self.cells.write().expect("cells lock");
        cells.insert(cell_id.clone(), formula.to_string());
        Ok(())
    }

    async fn copy(&self, dest: &CellId, src: &CellId) -> StoreResult<()> {
        let source_formula = {
            let cells = self.cells.read().expect("cells lock");
            cells.get(src).cloned()
        };
        match source_formula {
            Some(formula) => {
                self.store.update_cell(&self.name, dest, &formula).await?;
                let mut cells = self.cells.write().expect("cells lock");
                cells.insert(dest.clone(), formula);
                Ok(())
            }
            None => self.delete(dest).await,
        }
    }

    async fn delete(&self, cell_id: &CellId) -> StoreResult<()> {
        self.store.delete(&self.name, cell_id).await?;
        let mut cells = self.cells.write().expect("cells lock");
        cells.shift_remove(cell_id);
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.store.clear(&self.name).await?;
        let mut cells = self.cells.write().expect("cells lock");
        cells.clear();
        Ok(())
    }

    fn query(&self, cell_id: &CellId) -> CellRecord {
        let cells = self.cells.read().expect("cells lock");
        cells
            .get(cell_id)
            .map(|formula| self.record(formula))
            .unwrap_or_default()
    }

    fn dump(&self) -> Vec<CellPair> {
        let cells = self.cells.read().expect("cells lock");
        cells
            .iter()
            .map(|(id, formula)| (id.clone(), formula.clone()))
            .collect()
    }

    fn value_formulas(&self) -> HashMap<CellId, CellRecord> {
        let cells = self.cells.read().expect("cells lock");
        cells
            .iter()
            .map(|(id, formula)| (id.clone(), self.record(formula)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::MemStore;

    fn cell(raw: &str) -> CellId {
        CellId::parse(raw).unwrap()
    }

    async fn sheet(store: Arc<MemStore>) -> LocalSheet {
        LocalSheet::make(SheetName::parse("t").unwrap(), store)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn eval_writes_store_and_cache() {
        let store = Arc::new(MemStore::new());
        let engine = sheet(Arc::clone(&store)).await;

        engine.eval(&cell("a1"), "12").await.unwrap();

        assert_eq!(engine.query(&cell("a1")), CellRecord {
            formula: "12".into(),
            value: "12".into(),
        });
        let stored = store
            .read_formulas(&SheetName::parse("t").unwrap())
            .await
            .unwrap();
        assert_eq!(stored, vec![(cell("a1"), "12".into())]);
    }

    #[tokio::test]
    async fn syntax_error_leaves_cell_untouched() {
        let store = Arc::new(MemStore::new());
        let engine = sheet(Arc::clone(&store)).await;
        engine.eval(&cell("a1"), "5").await.unwrap();

        let err = engine.eval(&cell("a1"), "bogus").await.unwrap_err();
        assert!(matches!(err, StoreError::Syntax(_)));
        assert_eq!(engine.query(&cell("a1")).formula, "5");
    }

    #[tokio::test]
    async fn copy_duplicates_and_copy_from_empty_deletes() {
        let store = Arc::new(MemStore::new());
        let engine = sheet(store).await;
        engine.eval(&cell("a1"), "3").await.unwrap();

        engine.copy(&cell("b2"), &cell("a1")).await.unwrap();
        assert_eq!(engine.query(&cell("b2")).formula, "3");

        engine.copy(&cell("b2"), &cell("z9")).await.unwrap();
        assert!(!engine.query(&cell("b2")).has_formula());
    }

    #[tokio::test]
    async fn make_loads_existing_store_state() {
        let store = Arc::new(MemStore::new());
        let name = SheetName::parse("t").unwrap();
        store.update_cell(&name, &cell("c3"), "9").await.unwrap();

        let engine = sheet(store).await;
        assert_eq!(engine.dump(), vec![(cell("c3"), "9".into())]);
        assert_eq!(engine.value_formulas().len(), 1);
    }

    #[tokio::test]
    async fn clear_empties_cache_and_store() {
        let store = Arc::new(MemStore::new());
        let engine = sheet(Arc::clone(&store)).await;
        engine.eval(&cell("a1"), "1").await.unwrap();
        engine.clear().await.unwrap();

        assert!(engine.dump().is_empty());
        let stored = store
            .read_formulas(&SheetName::parse("t").unwrap())
            .await
            .unwrap();
        assert!(stored.is_empty());
    }
}
