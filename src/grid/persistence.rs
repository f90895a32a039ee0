//! Snapshot save/restore through the key-value store.
//!
//! A snapshot is written after every sort, filter, page-size and
//! column-width change. At build the grid reads its snapshot back; a missing
//! or malformed snapshot is ignored, and a well-formed one is checked against
//! the current columns before it is applied.

use super::DataGrid;
use crate::config::GridConfig;
use crate::constants::STORAGE_KEY_PREFIX;
use crate::data::ingest::clamp_column_width;
use crate::error::PersistenceError;
use crate::types::{ColumnDescriptor, FilterCriteria, SortState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted view state for one grid
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub sort: SortState,
    pub page_size: usize,
    pub filters: FilterCriteria,
    pub column_widths: BTreeMap<String, f32>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Drop whatever no longer fits the columns or config: sorts on unknown
    /// or non-sortable columns, page sizes outside the choices, filters on
    /// unknown or non-filterable columns, and widths of unknown columns.
    pub fn validated(mut self, columns: &[ColumnDescriptor], config: &GridConfig) -> Self {
        let column = |key: &str| columns.iter().find(|c| c.key == key);

        if let Some(key) = self.sort.column.as_deref() {
            if !column(key).is_some_and(|c| c.sortable) {
                tracing::debug!(column = key, "Snapshot sort column no longer sortable");
                self.sort = SortState::default();
            }
        }

        if !config.allows_page_size(self.page_size) {
            self.page_size = config.page_size;
        }

        self.filters
            .retain(|key, criterion| column(key).is_some_and(|c| c.filterable) && criterion.is_active());

        self.column_widths.retain(|key, width| {
            *width = clamp_column_width(*width);
            column(key).is_some()
        });

        self
    }
}

impl DataGrid {
    /// Store key for this grid's snapshot
    pub fn storage_key(&self) -> String {
        format!("{}{}", STORAGE_KEY_PREFIX, self.identifier)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            sort: self.sort.clone(),
            page_size: self.pagination.page_size,
            filters: self.filters.clone(),
            column_widths: self
                .columns
                .iter()
                .filter_map(|c| c.width.map(|w| (c.key.clone(), w)))
                .collect(),
        }
    }

    /// Write the snapshot if persistence is on. Failures are logged only.
    pub(crate) fn persist(&self) {
        if !self.config.persist_state {
            return;
        }

        let key = self.storage_key();
        let result = self
            .snapshot()
            .to_json()
            .and_then(|json| self.services.store.set(&key, &json));
        match result {
            Ok(()) => tracing::trace!(%key, "Snapshot saved"),
            Err(e) => tracing::warn!(%key, "Failed to save snapshot: {}", e),
        }
    }

    /// Apply a stored snapshot, if any, and recompute the view.
    pub(crate) fn restore(&mut self) {
        if !self.config.persist_state {
            return;
        }

        let key = self.storage_key();
        let Some(json) = self.services.store.get(&key) else {
            tracing::debug!(%key, "No snapshot to restore");
            return;
        };
        let snapshot = match Snapshot::from_json(&json) {
            Ok(snapshot) => snapshot.validated(&self.columns, &self.config),
            Err(e) => {
                tracing::debug!(%key, "Ignoring malformed snapshot: {}", e);
                return;
            }
        };

        self.sort = snapshot.sort;
        self.pagination.set_page_size(snapshot.page_size);
        self.filters = snapshot.filters;
        for column in &mut self.columns {
            if let Some(width) = snapshot.column_widths.get(&column.key) {
                column.width = Some(*width);
            }
        }

        self.recompute();
        tracing::debug!(%key, "Snapshot restored");
    }
}
