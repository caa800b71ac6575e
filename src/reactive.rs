//! Reactive session controller for a single-page surface.
//!
//! Holds only UI state (focused cell, pending copy source, last-applied
//! version, error display); the engine stays the source of truth for cell
//! content. Mutations either fully apply or do not start, so there is no
//! rollback: on failure the session is left exactly as before the attempt,
//! preserving retry-ability. Failures never escape the session; they are
//! converted into the error display at single-action granularity.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::{Engine, LocalSheet};
use crate::error::StoreResult;
use crate::store::SsStore;
use crate::types::{CellId, CellRecord};
use crate::validate;

/// Cell context-menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Copy,
    Delete,
    Paste,
}

/// One menu entry: a disabled item presents its generic label and no action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub action: Option<MenuAction>,
}

pub struct Session<E: Engine> {
    engine: E,
    focused: Option<CellId>,
    copy_source: Option<CellId>,
    version: u64,
    error: String,
}

impl<E: Engine> std::fmt::Debug for Session<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("focused", &self.focused)
            .field("copy_source", &self.copy_source)
            .field("version", &self.version)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl Session<LocalSheet> {
    /// Open a named sheet over a store (typically a [`crate::client::StoreClient`]).
    /// The name is validated before the engine is built.
    pub async fn open(raw_name: &str, store: Arc<dyn SsStore>) -> StoreResult<Self> {
        let name = validate::validate_sheet_name(raw_name)
            .map_err(crate::error::StoreError::BadRequest)?;
        let engine = LocalSheet::make(name, store).await?;
        Ok(Self::new(engine))
    }
}

impl<E: Engine> Session<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            focused: None,
            copy_source: None,
            version: 0,
            error: String::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn focused(&self) -> Option<&CellId> {
        self.focused.as_ref()
    }

    pub fn copy_source(&self) -> Option<&CellId> {
        self.copy_source.as_ref()
    }

    /// Version of the last applied mutation; a change tells the view to
    /// re-project from the engine.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    /// Formula of the focused cell, for the input widget.
    pub fn focused_formula(&self) -> String {
        self.focused
            .as_ref()
            .map(|id| self.engine.query(id).formula)
            .unwrap_or_default()
    }

    /// Current cell records for view projection.
    pub fn cells(&self) -> HashMap<CellId, CellRecord> {
        self.engine.value_formulas()
    }

    /// Focusing is local-only: it never contacts the store, and it clears
    /// any displayed error.
    pub fn focus(&mut self, cell_id: CellId) {
        self.focused = Some(cell_id);
        self.error.clear();
    }

    /// Submit a formula for the focused cell.
    pub async fn submit_formula(&mut self, formula: &str) {
        let Some(cell_id) = self.focused.clone() else {
            self.error = "no cell is focused".to_string();
            return;
        };
        match self.engine.eval(&cell_id, formula).await {
            Ok(()) => self.applied(),
            Err(err) => self.error = err.message(),
        }
    }

    /// Context menu for the focused cell. Copy and Delete require the
    /// focused cell to have a formula; Paste requires a recorded copy
    /// source with a formula (and somewhere to paste to).
    pub fn cell_menu(&self) -> Vec<MenuItem> {
        let focused_record = self
            .focused
            .as_ref()
            .map(|id| self.engine.query(id))
            .unwrap_or_default();
        let source_record = self
            .copy_source
            .as_ref()
            .map(|id| self.engine.query(id))
            .unwrap_or_default();

        let focused_label = self.focused.as_ref().map(CellId::label).unwrap_or_default();
        let source_label = self.copy_source.as_ref().map(CellId::label).unwrap_or_default();

        let can_copy = focused_record.has_formula();
        let can_paste = source_record.has_formula() && self.focused.is_some();

        vec![
            MenuItem {
                label: if can_copy { format!("Copy {focused_label}") } else { "Copy".into() },
                action: can_copy.then_some(MenuAction::Copy),
            },
            MenuItem {
                label: if can_copy { format!("Delete {focused_label}") } else { "Delete".into() },
                action: can_copy.then_some(MenuAction::Delete),
            },
            MenuItem {
                label: if can_paste {
                    format!("Paste {source_label} to {focused_label}")
                } else {
                    "Paste".into()
                },
                action: can_paste.then_some(MenuAction::Paste),
            },
        ]
    }

    /// Invoke a menu action. Invoking one whose precondition does not hold
    /// is a no-op (the menu presents no action for it).
    pub async fn invoke(&mut self, action: MenuAction) {
        match action {
            MenuAction::Copy => {
                if self.focused.is_some() && self.engine_has_formula(self.focused.as_ref()) {
                    // Recording the source is local-only.
                    self.copy_source = self.focused.clone();
                }
            }
            MenuAction::Delete => {
                let Some(cell_id) = self.focused.clone() else { return };
                if !self.engine_has_formula(Some(&cell_id)) {
                    return;
                }
                match self.engine.delete(&cell_id).await {
                    Ok(()) => self.applied(),
                    Err(err) => self.error = err.message(),
                }
            }
            MenuAction::Paste => {
                let (Some(dest), Some(src)) = (self.focused.clone(), self.copy_source.clone())
                else {
                    return;
                };
                if !self.engine_has_formula(Some(&src)) {
                    return;
                }
                match self.engine.copy(&dest, &src).await {
                    Ok(()) => self.applied(),
                    Err(err) => self.error = err.message(),
                }
            }
        }
    }

    /// Sheet-name menu: clear the whole sheet.
    pub async fn clear(&mut self) {
        match self.engine.clear().await {
            Ok(()) => self.applied(),
            Err(err) => self.error = err.message(),
        }
    }

    fn applied(&mut self) {
        self.version += 1;
        self.error.clear();
    }

    fn engine_has_formula(&self, cell_id: Option<&CellId>) -> bool {
        cell_id.map(|id| self.engine.query(id).has_formula()).unwrap_or(false)
    }
}
