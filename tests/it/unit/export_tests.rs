//! Unit tests for grid export.

use crate::helpers::{EventLog, TestGridBuilder, indices, toast_variants};
use datagrid::constants::{CSV_MIME, EXCEL_MIME};
use datagrid::notifications::ToastVariant;
use datagrid::{
    ColumnSpec, EventKind, ExportError, ExportFormat, ExportOutcome, GridError, RawRecord,
    ValueType,
};

#[test]
fn test_export_filtered_rows_in_view_order() {
    let builder = TestGridBuilder::people();
    let delivery = builder.delivery.clone();
    let mut grid = builder.build();
    grid.sort("age").unwrap();
    grid.search("i");
    grid.search("ci");

    let outcome = grid.export_data(ExportFormat::Csv, None).unwrap();
    let ExportOutcome::Completed { content, filename, .. } = &outcome else {
        panic!("small export should complete inline");
    };
    assert_eq!(content, "Name,Age\nCid,40\n");
    assert!(filename.starts_with("test-grid_"));
    assert!(filename.ends_with(".csv"));

    let files = delivery.files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].mime, CSV_MIME);
    assert_eq!(&files[0].content, content);
}

#[test]
fn test_sorted_export_follows_view() {
    let mut grid = TestGridBuilder::people().build();
    grid.sort("age").unwrap();
    let outcome = grid.export_data(ExportFormat::Csv, None).unwrap();
    let ExportOutcome::Completed { content, .. } = outcome else {
        panic!("expected inline export");
    };
    assert_eq!(content, "Name,Age\nAnn,25\nBob,30\nCid,40\n");
}

#[test]
fn test_excel_uses_csv_content_and_excel_mime() {
    let builder = TestGridBuilder::people();
    let delivery = builder.delivery.clone();
    let mut grid = builder.build();

    let outcome = grid.export_data(ExportFormat::Excel, None).unwrap();
    assert!(outcome.filename().ends_with(".xls"));
    let files = delivery.files();
    assert_eq!(files[0].mime, EXCEL_MIME);
    assert_eq!(files[0].content, "Name,Age\nBob,30\nAnn,25\nCid,40\n");
}

#[test]
fn test_pdf_is_unsupported_without_side_effects() {
    let builder = TestGridBuilder::people();
    let delivery = builder.delivery.clone();
    let toasts = builder.toasts.clone();
    let mut grid = builder.build();
    let log = EventLog::attach(&grid);

    let result = grid.export_data(ExportFormat::Pdf, None);
    assert_eq!(
        result,
        Err(GridError::Export(ExportError::Unsupported {
            format: ExportFormat::Pdf
        }))
    );
    assert!(delivery.files().is_empty());
    assert_eq!(log.len(), 0);
    assert_eq!(toast_variants(&toasts), vec![ToastVariant::Warning]);
}

#[test]
fn test_hidden_columns_are_not_exported() {
    let mut grid = TestGridBuilder::new(
        vec![
            ColumnSpec::new("Name", ValueType::Text),
            ColumnSpec::new("Secret", ValueType::Text).hidden(),
            ColumnSpec::new("Age", ValueType::Number),
        ],
        vec![RawRecord::new(["Ann", "hunter2", "25"])],
    )
    .build();

    let outcome = grid.export_data(ExportFormat::Csv, None).unwrap();
    let ExportOutcome::Completed { content, .. } = outcome else {
        panic!("expected inline export");
    };
    assert_eq!(content, "Name,Age\nAnn,25\n");

    grid.set_column_visible("secret", true).unwrap();
    let outcome = grid.export_data(ExportFormat::Csv, None).unwrap();
    let ExportOutcome::Completed { content, .. } = outcome else {
        panic!("expected inline export");
    };
    assert_eq!(content, "Name,Secret,Age\nAnn,hunter2,25\n");
}

#[test]
fn test_fields_are_quoted() {
    let mut grid = TestGridBuilder::new(
        vec![
            ColumnSpec::new("Name", ValueType::Text),
            ColumnSpec::new("Quote", ValueType::Text),
        ],
        vec![RawRecord::new(["Smith, John", "say \"hi\""])],
    )
    .build();

    let outcome = grid.export_data(ExportFormat::Csv, None).unwrap();
    let ExportOutcome::Completed { content, .. } = outcome else {
        panic!("expected inline export");
    };
    assert_eq!(content, "Name,Quote\n\"Smith, John\",\"say \"\"hi\"\"\"\n");
}

#[test]
fn test_scoped_export_keeps_hidden_rows_last() {
    let mut grid = TestGridBuilder::numbered(6).build();
    grid.sort("id").unwrap();
    grid.sort("id").unwrap();
    grid.search("row 5");

    // Row 5 (index 4) is in view; rows 1 and 3 are filtered out
    let outcome = grid
        .export_data(ExportFormat::Csv, Some(&indices(&[2, 4, 0, 99])))
        .unwrap();
    let ExportOutcome::Completed { content, .. } = outcome else {
        panic!("expected inline export");
    };
    assert_eq!(content, "Id,Label\n5,row 5\n1,row 1\n3,row 3\n");
}

#[test]
fn test_export_with_no_rows_writes_header() {
    let mut grid = TestGridBuilder::people().build();
    grid.search("nobody");
    let outcome = grid.export_data(ExportFormat::Csv, None).unwrap();
    let ExportOutcome::Completed { content, .. } = outcome else {
        panic!("expected inline export");
    };
    assert_eq!(content, "Name,Age\n");
}

#[test]
fn test_export_success_notifies_and_emits() {
    let builder = TestGridBuilder::people();
    let toasts = builder.toasts.clone();
    let mut grid = builder.build();
    let log = EventLog::attach(&grid);

    let outcome = grid.export_data(ExportFormat::Csv, None).unwrap();
    assert_eq!(log.of_kind(EventKind::ExportCompleted).len(), 1);
    let message = toasts.lock().latest().map(|t| t.message.clone());
    assert_eq!(
        message,
        Some(format!("Exported 3 rows to {}", outcome.filename()))
    );
}

#[test]
fn test_export_records_metric() {
    let mut grid = TestGridBuilder::people().build();
    grid.export_data(ExportFormat::Csv, None).unwrap();
    assert!(grid.metrics().stats("export").is_some_and(|s| s.count == 1));
}
