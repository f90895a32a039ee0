//! CSV/TSV and JSON row sources backed by polars.
//!
//! Loads a file into column specs plus raw string records, ready for
//! [`crate::grid::DataGrid`] ingestion. Column value types are inferred from
//! the polars schema; cell text is rendered the way it will be displayed and
//! exported.

use crate::constants::{MAX_SOURCE_ROWS, SCHEMA_INFER_ROWS};
use crate::data::error::{DataError, DataResult};
use crate::types::{ColumnSpec, RawRecord, ValueType};
use polars::prelude::*;
use std::num::NonZeroUsize;
use std::path::Path;

/// Columns and raw records read from a file
#[derive(Clone, Debug)]
pub struct RowSource {
    /// Human-readable name (file stem)
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub records: Vec<RawRecord>,
}

impl RowSource {
    pub fn row_count(&self) -> usize {
        self.records.len()
    }
}

/// Load a CSV/TSV or JSON file, picking the reader from the extension.
pub fn load_file(path: &Path) -> DataResult<RowSource> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "json" => load_json(path),
        "csv" | "tsv" | "txt" => load_csv(path),
        other => Err(DataError::InvalidData(format!(
            "unsupported file type: {:?}",
            other
        ))),
    }
}

/// Load a CSV file (`.tsv` files use a tab separator).
pub fn load_csv(path: &Path) -> DataResult<RowSource> {
    let start = std::time::Instant::now();

    let separator = if path.extension().map(|e| e == "tsv").unwrap_or(false) {
        b'\t'
    } else {
        b','
    };

    if std::fs::metadata(path)?.len() == 0 {
        return Err(DataError::EmptyFile);
    }

    let df = LazyCsvReader::new(path.to_path_buf())
        .with_has_header(true)
        .with_separator(separator)
        .with_infer_schema_length(Some(SCHEMA_INFER_ROWS))
        .finish()?
        .collect()?;

    let source = frame_to_source(&df, file_name(path))?;

    tracing::debug!(
        "Loaded CSV {} with {} rows x {} cols in {:?}",
        path.display(),
        source.records.len(),
        source.columns.len(),
        start.elapsed()
    );

    Ok(source)
}

/// Load a JSON file holding an array of objects.
pub fn load_json(path: &Path) -> DataResult<RowSource> {
    let start = std::time::Instant::now();

    let file = std::fs::File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Err(DataError::EmptyFile);
    }

    let df = JsonReader::new(file)
        .with_json_format(JsonFormat::Json)
        .infer_schema_len(NonZeroUsize::new(SCHEMA_INFER_ROWS))
        .finish()?;

    let source = frame_to_source(&df, file_name(path))?;

    tracing::debug!(
        "Loaded JSON {} with {} rows x {} cols in {:?}",
        path.display(),
        source.records.len(),
        source.columns.len(),
        start.elapsed()
    );

    Ok(source)
}

fn file_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Data")
        .to_string()
}

fn frame_to_source(df: &DataFrame, name: String) -> DataResult<RowSource> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    if names.is_empty() {
        return Err(DataError::NoColumns);
    }

    let row_count = df.height();
    if row_count > MAX_SOURCE_ROWS {
        return Err(DataError::TooManyRows {
            rows: row_count,
            max_rows: MAX_SOURCE_ROWS,
        });
    }

    let frame_columns: Vec<&Column> = names
        .iter()
        .map(|name| df.column(name))
        .collect::<PolarsResult<_>>()?;

    let columns = names
        .iter()
        .zip(&frame_columns)
        .map(|(name, column)| ColumnSpec::new(name.clone(), infer_value_type(column)))
        .collect();

    let records = (0..row_count)
        .map(|row_idx| {
            RawRecord::new(
                frame_columns
                    .iter()
                    .map(|column| cell_text(column, row_idx)),
            )
        })
        .collect();

    Ok(RowSource {
        name,
        columns,
        records,
    })
}

/// Infer the grid value type from a polars column dtype
fn infer_value_type(column: &Column) -> ValueType {
    match column.dtype() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64 => ValueType::Number,
        DataType::Boolean => ValueType::Boolean,
        DataType::Date | DataType::Datetime(_, _) => ValueType::Date,
        _ => ValueType::Text,
    }
}

/// Render a polars cell as display text
fn cell_text(column: &Column, row_idx: usize) -> String {
    let Ok(val) = column.get(row_idx) else {
        return String::new();
    };

    match val {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_float(v as f64),
        AnyValue::Float64(v) => format_float(v),
        AnyValue::Boolean(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => {
            let s_str: &str = &s;
            s_str.to_string()
        }
        _ => format!("{}", val),
    }
}

/// Whole numbers print without a trailing `.0`
fn format_float(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
