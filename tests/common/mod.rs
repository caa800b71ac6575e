//! Shared test doubles.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sheetstore::error::{StoreError, StoreResult};
use sheetstore::store::{MemStore, SsStore};
use sheetstore::types::{CellId, CellPair, SheetName};

/// Store double that counts calls and can be told to fail `update_cell`
/// after a number of successful updates. Reads and deletes always work, so
/// a test can inspect what a partial failure left behind.
pub struct SpyStore {
    inner: MemStore,
    calls: AtomicUsize,
    updates: AtomicUsize,
    fail_updates_after: Option<usize>,
}

impl SpyStore {
    pub fn new() -> Self {
        Self {
            inner: MemStore::new(),
            calls: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            fail_updates_after: None,
        }
    }

    pub fn failing_updates_after(successes: usize) -> Self {
        Self {
            fail_updates_after: Some(successes),
            ..Self::new()
        }
    }

    /// Total store calls of any kind.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SsStore for SpyStore {
    async fn read_formulas(&self, name: &SheetName) -> StoreResult<Vec<CellPair>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.read_formulas(name).await
    }

    async fn update_cell(
        &self,
        name: &SheetName,
        cell_id: &CellId,
        formula: &str,
    ) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let done = self.updates.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.fail_updates_after {
            if done >= limit {
                return Err(StoreError::Backend("injected backend failure".into()));
            }
        }
        self.inner.update_cell(name, cell_id, formula).await
    }

    async fn delete(&self, name: &SheetName, cell_id: &CellId) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(name, cell_id).await
    }

    async fn clear(&self, name: &SheetName) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.clear(name).await
    }
}
