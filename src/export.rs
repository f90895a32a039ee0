//! CSV serialization for grid exports.
//!
//! An [`ExportJob`] carries everything serialization needs (headers and
//! already-projected field text), so it can run on the interaction thread or
//! be shipped to a [`crate::services::TaskOffload`] worker and produce the
//! same bytes either way.

use crate::constants::{CSV_MIME, EXCEL_MIME};
use crate::profile_scope;
use crate::types::ExportFormat;
use chrono::NaiveDateTime;
use std::borrow::Cow;
use uuid::Uuid;

/// A self-contained serialization request
#[derive(Clone, Debug, PartialEq)]
pub struct ExportJob {
    /// Correlates the completion with this request
    pub id: Uuid,
    pub format: ExportFormat,
    pub filename: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub separator: char,
}

impl ExportJob {
    pub fn new(
        format: ExportFormat,
        filename: String,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        separator: char,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            format,
            filename,
            headers,
            rows,
            separator,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Serialize the job. Csv and Excel share one algorithm.
    pub fn run(&self) -> String {
        serialize_csv(&self.headers, &self.rows, self.separator)
    }
}

/// Header record then one record per row, each terminated by `\n`.
pub fn serialize_csv(headers: &[String], rows: &[Vec<String>], separator: char) -> String {
    profile_scope!("serialize_csv");

    let mut out = String::with_capacity(estimate_len(headers, rows));
    write_record(&mut out, headers, separator);
    for row in rows {
        write_record(&mut out, row, separator);
    }
    out
}

fn write_record(out: &mut String, fields: &[String], separator: char) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(separator);
        }
        out.push_str(&quote_csv_field(field, separator));
    }
    out.push('\n');
}

fn estimate_len(headers: &[String], rows: &[Vec<String>]) -> usize {
    let record_len = |fields: &[String]| fields.iter().map(|f| f.len() + 1).sum::<usize>() + 1;
    record_len(headers) + rows.iter().map(|r| record_len(r.as_slice())).sum::<usize>()
}

/// Quote a CSV field if necessary (contains separator, quotes, or newlines)
pub fn quote_csv_field(value: &str, separator: char) -> Cow<'_, str> {
    let needs_quoting = value.contains(separator)
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');

    if needs_quoting {
        // Escape internal quotes by doubling them
        let escaped = value.replace('"', "\"\"");
        Cow::Owned(format!("\"{}\"", escaped))
    } else {
        Cow::Borrowed(value)
    }
}

/// Download name: `{identifier}_{YYYYMMDD_HHMMSS}.{ext}`
pub fn export_filename(identifier: &str, format: ExportFormat, at: NaiveDateTime) -> String {
    format!(
        "{}_{}.{}",
        identifier,
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// MIME type used when delivering a format
pub fn mime_for(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Excel => EXCEL_MIME,
        ExportFormat::Csv | ExportFormat::Pdf => CSV_MIME,
    }
}
