//! Core types for the data-grid engine.
//!
//! This module defines the column model, row records and cell values, and the
//! small value types (sort state, filter criteria, page tokens, export
//! formats) that flow between the engine components.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Column Model
// ============================================================================

/// Value type of a column, driving cell parsing, comparison and filtering.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Text,
    Number,
    Date,
    Boolean,
    Enum,
}

fn default_true() -> bool {
    true
}

/// Column description as supplied by the host, before ingestion.
///
/// `key` may be omitted, in which case it is derived from `title`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    #[serde(default)]
    pub key: Option<String>,
    pub title: String,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default = "default_true")]
    pub sortable: bool,
    #[serde(default = "default_true")]
    pub filterable: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub width: Option<f32>,
}

impl ColumnSpec {
    /// A sortable, filterable, visible column with a derived key.
    pub fn new(title: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            key: None,
            title: title.into(),
            value_type,
            sortable: true,
            filterable: true,
            visible: true,
            width: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// An ingested column. Only `width` and `visible` change after ingestion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub key: String,
    pub title: String,
    pub value_type: ValueType,
    pub sortable: bool,
    pub filterable: bool,
    pub visible: bool,
    pub width: Option<f32>,
}

// ============================================================================
// Rows & Cells
// ============================================================================

/// Stable row identity, assigned at ingestion and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowIndex(pub u64);

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to the presentation of a row, owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowHandle(pub u64);

/// A parsed date cell. `Invalid` keeps unparseable input from failing ingestion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateValue {
    Valid(NaiveDateTime),
    Invalid,
}

impl DateValue {
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            DateValue::Valid(dt) => Some(*dt),
            DateValue::Invalid => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        self.as_datetime().map(|dt| dt.date())
    }
}

/// Typed cell value used for comparison and filtering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(DateValue),
    Boolean(bool),
    Enum(String),
}

impl CellValue {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

/// One cell: the trimmed display text plus its typed value.
///
/// Search and export work on `raw`; sorting and criteria work on `value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub raw: String,
    pub value: CellValue,
}

/// Raw row input: one string per column, in column order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub cells: Vec<String>,
    #[serde(default)]
    pub handle: Option<RowHandle>,
}

impl RawRecord {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
            handle: None,
        }
    }

    pub fn with_handle(mut self, handle: RowHandle) -> Self {
        self.handle = Some(handle);
        self
    }
}

/// An ingested row. Its cell keys are exactly the engine's column keys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RowRecord {
    pub index: RowIndex,
    pub cells: HashMap<String, Cell>,
    #[serde(default)]
    pub handle: Option<RowHandle>,
}

impl RowRecord {
    pub fn cell(&self, key: &str) -> Option<&Cell> {
        self.cells.get(key)
    }

    pub fn value(&self, key: &str) -> Option<&CellValue> {
        self.cells.get(key).map(|c| &c.value)
    }

    /// Display text of a cell, empty for unknown keys.
    pub fn text(&self, key: &str) -> &str {
        self.cells.get(key).map(|c| c.raw.as_str()).unwrap_or("")
    }
}

// ============================================================================
// Sort
// ============================================================================

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Active sort column and direction. At most one column sorts at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn by(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: Some(column.into()),
            direction,
        }
    }

    pub fn is_active(&self) -> bool {
        self.column.is_some()
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Operand of an equality criterion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::Number(n) => write!(f, "{}", n),
            FilterValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A per-column filter criterion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterCriterion {
    Contains {
        value: String,
    },
    Equals {
        value: FilterValue,
    },
    Range {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    DateRange {
        #[serde(default)]
        from: Option<NaiveDate>,
        #[serde(default)]
        to: Option<NaiveDate>,
    },
}

impl FilterCriterion {
    pub fn contains(value: impl Into<String>) -> Self {
        FilterCriterion::Contains {
            value: value.into(),
        }
    }

    pub fn equals(value: FilterValue) -> Self {
        FilterCriterion::Equals { value }
    }

    pub fn min(min: f64) -> Self {
        FilterCriterion::Range {
            min: Some(min),
            max: None,
        }
    }

    pub fn max(max: f64) -> Self {
        FilterCriterion::Range {
            min: None,
            max: Some(max),
        }
    }

    pub fn between(min: f64, max: f64) -> Self {
        FilterCriterion::Range {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        FilterCriterion::DateRange { from, to }
    }

    /// Whether the criterion restricts anything. Inactive criteria match all rows.
    pub fn is_active(&self) -> bool {
        match self {
            FilterCriterion::Contains { value } => !value.is_empty(),
            FilterCriterion::Equals { .. } => true,
            FilterCriterion::Range { min, max } => min.is_some() || max.is_some(),
            FilterCriterion::DateRange { from, to } => from.is_some() || to.is_some(),
        }
    }
}

/// Active criteria keyed by column key. Ordered for stable snapshots.
pub type FilterCriteria = BTreeMap<String, FilterCriterion>;

// ============================================================================
// Pagination
// ============================================================================

/// One entry of the page-number strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageToken {
    Page(usize),
    Ellipsis,
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageToken::Page(n) => write!(f, "{}", n),
            PageToken::Ellipsis => write!(f, "…"),
        }
    }
}

// ============================================================================
// Export & Bulk Actions
// ============================================================================

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl ExportFormat {
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Excel => "Excel",
            ExportFormat::Pdf => "PDF",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xls",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xls" | "xlsx" => Ok(ExportFormat::Excel),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

/// A bulk action resolved from its action key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BulkAction {
    Delete,
    Export,
    Custom(String),
}

impl BulkAction {
    pub fn from_key(key: &str) -> Self {
        match key {
            "delete" => BulkAction::Delete,
            "export" => BulkAction::Export,
            other => BulkAction::Custom(other.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            BulkAction::Delete => "delete",
            BulkAction::Export => "export",
            BulkAction::Custom(key) => key,
        }
    }
}
