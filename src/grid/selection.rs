//! Row selection and bulk actions.

use super::{DataGrid, ExportOutcome};
use crate::error::GridResult;
use crate::events::GridEvent;
use crate::notifications::ToastVariant;
use crate::types::{BulkAction, ExportFormat, RowIndex, RowRecord};
use std::collections::{BTreeSet, HashSet};

/// Result of [`DataGrid::execute_bulk_action`]
#[derive(Clone, Debug, PartialEq)]
pub enum BulkOutcome {
    /// Selection was empty; the user was warned
    NothingSelected,
    /// The user declined the confirmation; nothing changed
    Declined,
    /// Rows removed from the dataset
    Deleted(usize),
    /// Selected rows exported
    Exported(ExportOutcome),
    /// Forwarded to subscribers as `BulkActionRequested`
    Forwarded { action: String, rows: usize },
}

impl DataGrid {
    /// Flip selection of one row. Unknown rows are ignored. Returns whether
    /// the row is selected afterwards.
    pub fn toggle_row(&mut self, index: RowIndex) -> bool {
        if self.position_of(index).is_none() {
            tracing::debug!(grid = %self.identifier, %index, "Ignoring toggle of unknown row");
            return false;
        }

        let selected = if self.selection.remove(&index) {
            false
        } else {
            self.selection.insert(index);
            true
        };
        self.emit_selection_changed();
        selected
    }

    /// Select or deselect every row on the current page. Rows on other pages
    /// keep their selection.
    pub fn select_all(&mut self, selected: bool) {
        let page: Vec<RowIndex> = self.current_page_data().iter().map(|r| r.index).collect();
        for index in page {
            if selected {
                self.selection.insert(index);
            } else {
                self.selection.remove(&index);
            }
        }
        self.emit_selection_changed();
    }

    pub fn clear_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.selection.clear();
        self.emit_selection_changed();
    }

    pub fn is_selected(&self, index: RowIndex) -> bool {
        self.selection.contains(&index)
    }

    pub fn selection(&self) -> &BTreeSet<RowIndex> {
        &self.selection
    }

    /// Selected rows in full-dataset order
    pub fn selected_rows(&self) -> Vec<&RowRecord> {
        self.rows
            .iter()
            .filter(|r| self.selection.contains(&r.index))
            .collect()
    }

    /// Run a bulk action over the selection: `"delete"`, `"export"`, or any
    /// other key, which is forwarded to subscribers with the selected rows.
    pub fn execute_bulk_action(&mut self, key: &str) -> GridResult<BulkOutcome> {
        if self.selection.is_empty() {
            self.notifier()
                .notify("Select at least one row first", ToastVariant::Warning);
            return Ok(BulkOutcome::NothingSelected);
        }

        match BulkAction::from_key(key) {
            BulkAction::Delete => Ok(self.delete_selected()),
            BulkAction::Export => {
                let scope: Vec<RowIndex> = self.selection.iter().copied().collect();
                let outcome = self.export_data(ExportFormat::Csv, Some(&scope))?;
                Ok(BulkOutcome::Exported(outcome))
            }
            BulkAction::Custom(action) => {
                let rows: Vec<RowRecord> = self.selected_rows().into_iter().cloned().collect();
                let count = rows.len();
                tracing::debug!(grid = %self.identifier, %action, rows = count, "Forwarding bulk action");
                self.events.emit(GridEvent::BulkActionRequested {
                    action: action.clone(),
                    rows,
                });
                Ok(BulkOutcome::Forwarded {
                    action,
                    rows: count,
                })
            }
        }
    }

    fn delete_selected(&mut self) -> BulkOutcome {
        let count = self.selection.len();
        let message = if count == 1 {
            "Delete 1 selected row?".to_string()
        } else {
            format!("Delete {} selected rows?", count)
        };
        if !self.services.confirmation.confirm(&message) {
            tracing::debug!(grid = %self.identifier, "Delete declined");
            return BulkOutcome::Declined;
        }

        let doomed: HashSet<RowIndex> = std::mem::take(&mut self.selection).into_iter().collect();

        // Old position -> new position, for rows that survive
        let mut remap = Vec::with_capacity(self.rows.len());
        let mut next = 0;
        for row in &self.rows {
            if doomed.contains(&row.index) {
                remap.push(None);
            } else {
                remap.push(Some(next));
                next += 1;
            }
        }

        self.rows.retain(|r| !doomed.contains(&r.index));
        self.filtered = self.filtered.iter().filter_map(|&pos| remap[pos]).collect();
        self.pagination.set_total_rows(self.filtered.len());

        tracing::info!(grid = %self.identifier, count, "Deleted rows");
        let notice = if count == 1 {
            "Deleted 1 row".to_string()
        } else {
            format!("Deleted {} rows", count)
        };
        self.notifier().notify(&notice, ToastVariant::Success);
        self.events.emit(GridEvent::RowsDeleted { count });
        self.emit_selection_changed();
        BulkOutcome::Deleted(count)
    }

    fn emit_selection_changed(&self) {
        self.events.emit(GridEvent::SelectionChanged {
            selected: self.selection.iter().copied().collect(),
        });
    }
}
