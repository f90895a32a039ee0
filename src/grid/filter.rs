//! Search and per-column criteria.
//!
//! Every change recomputes the filtered rows from the full dataset. There is
//! no incremental patching; input is debounced instead.

use super::DataGrid;
use crate::data::ingest::{parse_bool, parse_date, parse_number};
use crate::events::GridEvent;
use crate::perf::measure;
use crate::types::{
    Cell, CellValue, ColumnDescriptor, FilterCriteria, FilterCriterion, FilterValue, RowRecord,
    ValueType,
};
use chrono::NaiveDate;
use std::time::Instant;

/// Whether `cell` satisfies `criterion` under the column's value type.
/// Inactive criteria match everything.
pub fn criterion_matches(
    column: &ColumnDescriptor,
    cell: &Cell,
    criterion: &FilterCriterion,
) -> bool {
    if !criterion.is_active() {
        return true;
    }

    match criterion {
        FilterCriterion::Contains { value } => {
            cell.raw.to_lowercase().contains(&value.to_lowercase())
        }
        FilterCriterion::Equals { value } => equals(column.value_type, cell, value),
        FilterCriterion::Range { min, max } => {
            let n = numeric(cell);
            min.is_none_or(|min| n >= min) && max.is_none_or(|max| n <= max)
        }
        FilterCriterion::DateRange { from, to } => match calendar_day(cell) {
            Some(day) => from.is_none_or(|from| day >= from) && to.is_none_or(|to| day <= to),
            None => false,
        },
    }
}

fn equals(value_type: ValueType, cell: &Cell, target: &FilterValue) -> bool {
    match value_type {
        ValueType::Number => {
            let target = match target {
                FilterValue::Number(n) => *n,
                FilterValue::Bool(b) => f64::from(u8::from(*b)),
                FilterValue::Text(s) => parse_number(s),
            };
            numeric(cell) == target
        }
        ValueType::Boolean => {
            let target = match target {
                FilterValue::Bool(b) => *b,
                FilterValue::Number(n) => *n != 0.0,
                FilterValue::Text(s) => parse_bool(s),
            };
            let actual = match &cell.value {
                CellValue::Boolean(b) => *b,
                _ => parse_bool(&cell.raw),
            };
            actual == target
        }
        ValueType::Date => {
            let target = match target {
                FilterValue::Text(s) => parse_date(s).as_date(),
                FilterValue::Number(_) | FilterValue::Bool(_) => None,
            };
            target.is_some_and(|target| calendar_day(cell) == Some(target))
        }
        ValueType::Text | ValueType::Enum => {
            cell.raw.to_lowercase() == target.to_string().to_lowercase()
        }
    }
}

fn numeric(cell: &Cell) -> f64 {
    match &cell.value {
        CellValue::Number(n) => *n,
        _ => parse_number(&cell.raw),
    }
}

fn calendar_day(cell: &Cell) -> Option<NaiveDate> {
    match &cell.value {
        CellValue::Date(date) => date.as_date(),
        _ => parse_date(&cell.raw).as_date(),
    }
}

/// Search needle prepared once per recompute
struct SearchNeedle {
    text: String,
    case_sensitive: bool,
}

impl SearchNeedle {
    fn new(query: &str, case_sensitive: bool) -> Self {
        let text = if case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };
        Self {
            text,
            case_sensitive,
        }
    }

    fn matches(&self, row: &RowRecord) -> bool {
        row.cells.values().any(|cell| {
            if self.case_sensitive {
                cell.raw.contains(&self.text)
            } else {
                cell.raw.to_lowercase().contains(&self.text)
            }
        })
    }
}

/// Positions of rows passing every criterion and the search, in full-dataset
/// order.
fn matching_positions(
    columns: &[ColumnDescriptor],
    rows: &[RowRecord],
    filters: &FilterCriteria,
    needle: Option<&SearchNeedle>,
) -> Vec<usize> {
    let active: Vec<(&ColumnDescriptor, &FilterCriterion)> = filters
        .iter()
        .filter(|(_, criterion)| criterion.is_active())
        .filter_map(|(key, criterion)| {
            columns
                .iter()
                .find(|c| &c.key == key)
                .map(|column| (column, criterion))
        })
        .collect();

    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            active.iter().all(|(column, criterion)| {
                row.cell(&column.key)
                    .is_some_and(|cell| criterion_matches(column, cell, criterion))
            })
        })
        .filter(|(_, row)| needle.is_none_or(|needle| needle.matches(row)))
        .map(|(pos, _)| pos)
        .collect()
}

impl DataGrid {
    /// Search every column for `query` as given, whitespace included.
    /// Queries shorter than the configured minimum clear the search.
    pub fn search(&mut self, query: &str) {
        self.search_debounce.cancel();

        self.search_query = if query.chars().count() < self.config.min_search_length {
            None
        } else {
            Some(query.to_string())
        };

        tracing::debug!(grid = %self.identifier, query = ?self.search_query, "Search");
        self.recompute();
    }

    /// Schedule a search after the debounce delay. A newer call replaces any
    /// pending query; `poll_timers` runs it once due.
    pub fn queue_search(&mut self, query: impl Into<String>, now: Instant) {
        self.search_debounce.schedule(query.into(), now);
    }

    /// Run due debounced/throttled work. Returns whether anything ran.
    pub fn poll_timers(&mut self, now: Instant) -> bool {
        let mut ran = false;
        if let Some(query) = self.search_debounce.poll(now) {
            self.search(&query);
            ran = true;
        }
        if let Some(width) = self.resize_throttle.flush(now) {
            self.apply_container_width(width);
            ran = true;
        }
        ran
    }

    pub fn has_pending_timers(&self) -> bool {
        self.search_debounce.is_pending() || self.resize_throttle.has_trailing()
    }

    /// Replace the active criteria and recompute. Criteria on unknown or
    /// non-filterable columns are dropped.
    pub fn apply_filters(&mut self, criteria: FilterCriteria) {
        self.filters = self.sanitize_criteria(criteria);
        tracing::debug!(grid = %self.identifier, active = self.filters.len(), "Filters applied");
        self.persist();
        self.recompute();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        tracing::debug!(grid = %self.identifier, "Filters cleared");
        self.persist();
        self.recompute();
    }

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    pub fn search_query(&self) -> Option<&str> {
        self.search_query.as_deref()
    }

    pub(crate) fn sanitize_criteria(&self, criteria: FilterCriteria) -> FilterCriteria {
        criteria
            .into_iter()
            .filter(|(key, criterion)| match self.column(key) {
                None => {
                    tracing::warn!(grid = %self.identifier, column = %key, "Dropping filter on unknown column");
                    false
                }
                Some(column) if !column.filterable => {
                    tracing::warn!(grid = %self.identifier, column = %key, "Dropping filter on non-filterable column");
                    false
                }
                Some(_) => criterion.is_active(),
            })
            .collect()
    }

    /// Re-derive the filtered rows from the full dataset, re-apply the
    /// active sort and go back to page 1.
    pub(crate) fn recompute(&mut self) {
        let needle = self
            .search_query
            .as_deref()
            .map(|q| SearchNeedle::new(q, self.config.case_sensitive_search));

        let (filtered, elapsed_ms) = measure(|| {
            matching_positions(&self.columns, &self.rows, &self.filters, needle.as_ref())
        });
        self.metrics.record("recompute", elapsed_ms);

        self.filtered = filtered;
        if self.sort.is_active() {
            self.apply_sort();
        }
        self.pagination.set_total_rows(self.filtered.len());
        self.pagination.current_page = 1;

        self.events.emit(GridEvent::FilterApplied {
            matched: self.filtered.len(),
            total: self.rows.len(),
        });
    }
}
