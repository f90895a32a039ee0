//! Single-column sort.

use super::DataGrid;
use crate::error::{GridError, GridResult};
use crate::events::GridEvent;
use crate::perf::measure;
use crate::types::{CellValue, RowRecord, SortDirection, SortState, ValueType};
use chrono::NaiveDateTime;
use std::cmp::Ordering;

/// Comparable projection of a cell, computed once per row per sort.
#[derive(Debug, PartialEq)]
enum SortKey {
    Number(f64),
    /// `None` for invalid or empty dates
    Date(Option<NaiveDateTime>),
    Text(String),
}

impl SortKey {
    fn of(row: &RowRecord, key: &str, value_type: ValueType) -> Self {
        let cell = row.cell(key);
        match value_type {
            ValueType::Number => SortKey::Number(
                cell.and_then(|c| c.value.as_f64()).unwrap_or(0.0),
            ),
            ValueType::Date => SortKey::Date(cell.and_then(|c| match &c.value {
                CellValue::Date(date) => date.as_datetime(),
                _ => None,
            })),
            ValueType::Text | ValueType::Boolean | ValueType::Enum => {
                SortKey::Text(cell.map(|c| c.raw.to_lowercase()).unwrap_or_default())
            }
        }
    }

    /// Ascending order. Invalid dates sort after every valid date.
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Date(a), SortKey::Date(b)) => match (a, b) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Stable sort of `positions` (into `rows`) by one column.
fn sort_positions(
    rows: &[RowRecord],
    positions: &mut Vec<usize>,
    key: &str,
    value_type: ValueType,
    direction: SortDirection,
) {
    let mut keyed: Vec<(usize, SortKey)> = positions
        .iter()
        .map(|&pos| (pos, SortKey::of(&rows[pos], key, value_type)))
        .collect();

    keyed.sort_by(|(_, a), (_, b)| {
        let ordering = a.compare(b);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    *positions = keyed.into_iter().map(|(pos, _)| pos).collect();
}

impl DataGrid {
    /// Sort by `key`. Sorting the active column again flips the direction;
    /// a new column starts ascending. Returns the new direction.
    pub fn sort(&mut self, key: &str) -> GridResult<SortDirection> {
        let column = self
            .column(key)
            .ok_or_else(|| GridError::UnknownColumn { key: key.to_string() })?;
        if !column.sortable {
            return Err(GridError::NotSortable { key: key.to_string() });
        }

        let direction = if self.sort.column.as_deref() == Some(key) {
            self.sort.direction.toggled()
        } else {
            SortDirection::Asc
        };
        self.sort = SortState::by(key, direction);
        self.apply_sort();

        self.pagination.current_page = 1;
        tracing::debug!(grid = %self.identifier, column = key, direction = direction.label(), "Sorted");
        self.persist();
        self.events.emit(GridEvent::SortChanged {
            column: key.to_string(),
            direction,
        });
        Ok(direction)
    }

    /// Drop the active sort; filtered rows return to full-dataset order.
    pub fn clear_sort(&mut self) {
        if !self.sort.is_active() {
            return;
        }
        self.sort = SortState::default();
        self.filtered.sort_unstable();
        self.pagination.current_page = 1;
        tracing::debug!(grid = %self.identifier, "Sort cleared");
        self.persist();
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Reorder the filtered rows by the active sort, if any.
    pub(crate) fn apply_sort(&mut self) {
        let Some(key) = self.sort.column.as_deref() else {
            return;
        };
        let Some(value_type) = self.column(key).map(|c| c.value_type) else {
            return;
        };

        let direction = self.sort.direction;
        let ((), elapsed_ms) = measure(|| {
            sort_positions(&self.rows, &mut self.filtered, key, value_type, direction)
        });
        self.metrics.record("sort", elapsed_ms);
    }
}
