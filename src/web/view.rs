//! Grid view model. Regenerated fully on every read, never patched
//! incrementally.

use serde::Serialize;

use crate::engine::Engine;
use crate::types::{CellId, CellPair};

pub const MIN_ROWS: usize = 10;
pub const MIN_COLS: usize = 10;

/// Renderable projection of a sheet: a header row of the sheet name plus
/// column labels, and one row of evaluated values per grid row.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub ss_name: String,
    pub header: Vec<String>,
    pub cells: Vec<RowView>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub row_num: usize,
    pub values: Vec<String>,
}

/// Project the engine's current state into a grid at least
/// `MIN_ROWS` x `MIN_COLS`, grown to cover every set cell.
pub fn view_model(engine: &dyn Engine) -> ViewModel {
    let dump = engine.dump();
    let (row_count, col_count) = grid_counts(&dump);

    let columns: Vec<String> = (0..col_count)
        .map(|i| char::from(b'A' + i as u8).to_string())
        .collect();

    let mut header = Vec::with_capacity(col_count + 1);
    header.push(engine.name().to_string());
    header.extend(columns.iter().cloned());

    let cells = (1..=row_count)
        .map(|row| RowView {
            row_num: row,
            values: (0..col_count)
                .map(|col| {
                    CellId::from_coords(col, row)
                        .map(|id| engine.query(&id).value)
                        .unwrap_or_default()
                })
                .collect(),
        })
        .collect();

    ViewModel {
        ss_name: engine.name().to_string(),
        header,
        cells,
    }
}

fn grid_counts(dump: &[CellPair]) -> (usize, usize) {
    let mut max_row = 0;
    let mut max_col = 0;
    for (id, _) in dump {
        max_row = max_row.max(id.row());
        max_col = max_col.max(id.col_index() + 1);
    }
    (max_row.max(MIN_ROWS), max_col.max(MIN_COLS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LocalSheet;
    use crate::store::MemStore;
    use crate::types::SheetName;
    use std::sync::Arc;

    async fn engine_with(pairs: &[(&str, &str)]) -> LocalSheet {
        let store = Arc::new(MemStore::new());
        let engine = LocalSheet::make(SheetName::parse("grid").unwrap(), store)
            .await
            .unwrap();
        for (id, formula) in pairs {
            engine.eval(&CellId::parse(id).unwrap(), formula).await.unwrap();
        }
        engine
    }

    #[tokio::test]
    async fn empty_sheet_renders_minimum_grid() {
        let engine = engine_with(&[]).await;
        let view = view_model(&engine);
        assert_eq!(view.header.len(), MIN_COLS + 1);
        assert_eq!(view.header[0], "grid");
        assert_eq!(view.header[1], "A");
        assert_eq!(view.cells.len(), MIN_ROWS);
        assert!(view.cells[0].values.iter().all(String::is_empty));
    }

    #[tokio::test]
    async fn grid_grows_to_cover_outlying_cells() {
        let engine = engine_with(&[("m15", "5")]).await;
        let view = view_model(&engine);
        // m is column 13 (index 12), so 13 columns; row 15 exceeds the min.
        assert_eq!(view.header.len(), 13 + 1);
        assert_eq!(view.cells.len(), 15);
        assert_eq!(view.cells[14].row_num, 15);
        assert_eq!(view.cells[14].values[12], "5");
    }

    #[tokio::test]
    async fn values_land_at_their_coordinates() {
        let engine = engine_with(&[("a1", "1"), ("b2", "2.5")]).await;
        let view = view_model(&engine);
        assert_eq!(view.cells[0].values[0], "1");
        assert_eq!(view.cells[1].values[1], "2.5");
        assert_eq!(view.cells[0].values[1], "");
    }
}
