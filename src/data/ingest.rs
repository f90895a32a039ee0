//! Column and row ingestion
//!
//! Turns host-supplied column specs and raw string records into the engine's
//! typed column model and row records. Cell parsing never fails: malformed
//! input degrades to a safe default (`0` for numbers, `Invalid` for dates,
//! `false` for booleans). Only a structurally broken column list is an error.

use crate::constants::MIN_COLUMN_WIDTH;
use crate::error::{GridError, GridResult};
use crate::types::{
    Cell, CellValue, ColumnDescriptor, ColumnSpec, DateValue, RawRecord, RowIndex, RowRecord,
    ValueType,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};

/// Date-time layouts tried after RFC 3339, in order
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Date-only layouts tried last, in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Tokens accepted as boolean true (after lower-casing)
const TRUTHY_TOKENS: &[&str] = &["true", "1"];

/// Derive a column key from its title: lower-case, runs of anything that is
/// not alphanumeric become a single `-`, no leading or trailing `-`.
///
/// # Examples
/// - `"First Name"` -> `"first-name"`
/// - `"  Price ($) "` -> `"price"`
pub fn derive_key(title: &str) -> String {
    let mut key = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !key.is_empty() {
                key.push('-');
            }
            pending_dash = false;
            key.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    key
}

/// Build the column model, failing fast on structural problems.
pub fn build_columns(specs: Vec<ColumnSpec>) -> GridResult<Vec<ColumnDescriptor>> {
    if specs.is_empty() {
        return Err(GridError::NoColumns);
    }

    let mut seen = HashSet::with_capacity(specs.len());
    let mut columns = Vec::with_capacity(specs.len());

    for spec in specs {
        let key = match &spec.key {
            Some(key) => key.trim().to_string(),
            None => derive_key(&spec.title),
        };
        if key.is_empty() {
            return Err(GridError::MissingColumnKey { title: spec.title });
        }
        if !seen.insert(key.clone()) {
            return Err(GridError::DuplicateColumnKey { key });
        }

        columns.push(ColumnDescriptor {
            key,
            title: spec.title,
            value_type: spec.value_type,
            sortable: spec.sortable,
            filterable: spec.filterable,
            visible: spec.visible,
            width: spec.width.map(clamp_column_width),
        });
    }

    Ok(columns)
}

/// Column width floor shared by ingestion, resizing and restore.
/// Non-finite widths fall back to the minimum.
pub fn clamp_column_width(width: f32) -> f32 {
    if width.is_finite() {
        width.max(MIN_COLUMN_WIDTH)
    } else {
        MIN_COLUMN_WIDTH
    }
}

/// Parse raw records into rows with sequential stable indices starting at 0.
pub fn build_rows(columns: &[ColumnDescriptor], records: Vec<RawRecord>) -> Vec<RowRecord> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| build_row(columns, RowIndex(i as u64), record))
        .collect()
}

fn build_row(columns: &[ColumnDescriptor], index: RowIndex, record: RawRecord) -> RowRecord {
    if record.cells.len() > columns.len() {
        tracing::warn!(
            row = index.0,
            cells = record.cells.len(),
            columns = columns.len(),
            "Dropping extra cells from raw record"
        );
    }

    let mut raw_cells = record.cells.into_iter();
    let cells: HashMap<String, Cell> = columns
        .iter()
        .map(|col| {
            // Short records are padded with empty cells
            let raw = raw_cells.next().unwrap_or_default();
            (col.key.clone(), parse_cell(&raw, col.value_type))
        })
        .collect();

    RowRecord {
        index,
        cells,
        handle: record.handle,
    }
}

/// Parse one raw cell according to its column type.
pub fn parse_cell(raw: &str, value_type: ValueType) -> Cell {
    let text = raw.trim();
    let value = match value_type {
        ValueType::Number => CellValue::Number(parse_number(text)),
        ValueType::Date => CellValue::Date(parse_date(text)),
        ValueType::Boolean => CellValue::Boolean(parse_bool(text)),
        ValueType::Enum => CellValue::Enum(text.to_string()),
        ValueType::Text => CellValue::Text(text.to_string()),
    };

    Cell {
        raw: text.to_string(),
        value,
    }
}

/// Numeric parse with fallback `0`.
///
/// A single currency or percent symbol and thousands separators are ignored,
/// so `"$1,234.50"` parses as `1234.5`. Non-finite results count as failures.
pub fn parse_number(text: &str) -> f64 {
    let text = text.trim();
    if let Ok(n) = text.parse::<f64>() {
        return if n.is_finite() { n } else { 0.0 };
    }

    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | '%' | '€' | '£' | ',' | ' '))
        .collect();

    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Parse a date, keeping unparseable input as `DateValue::Invalid`.
pub fn parse_date(text: &str) -> DateValue {
    let text = text.trim();
    if text.is_empty() {
        return DateValue::Invalid;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return DateValue::Valid(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return DateValue::Valid(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return DateValue::Valid(dt);
            }
        }
    }

    DateValue::Invalid
}

/// Boolean parse from the fixed truthy-token set; anything else is false.
pub fn parse_bool(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    TRUTHY_TOKENS.contains(&lowered.as_str())
}
