//! Export offload and CSV round-trip tests

use crate::helpers::{EventLog, TestGridBuilder};
use datagrid::background::BackgroundExecutor;
use datagrid::data::load_file;
use datagrid::services::{DirectoryDelivery, TaskOffload};
use datagrid::{
    ColumnSpec, DataGrid, EventKind, ExportFormat, ExportOutcome, GridConfig, GridEvent,
    RawRecord, ValueType,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn drain_until<F>(executor: &BackgroundExecutor, mut done: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(5) {
        executor.process_results();
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    false
}

fn tricky_rows() -> TestGridBuilder {
    TestGridBuilder::new(
        vec![
            ColumnSpec::new("Name", ValueType::Text),
            ColumnSpec::new("Note", ValueType::Text),
            ColumnSpec::new("Amount", ValueType::Number),
        ],
        vec![
            RawRecord::new(["Smith, John", "said \"hi\"", "12"]),
            RawRecord::new(["Ann", "line one\nline two", "7.5"]),
            RawRecord::new(["Bob", "", "0"]),
        ],
    )
}

fn inline_content(grid: &mut DataGrid) -> String {
    match grid.export_data(ExportFormat::Csv, None).unwrap() {
        ExportOutcome::Completed { content, .. } => content,
        ExportOutcome::Pending { .. } => panic!("expected inline export"),
    }
}

#[test]
fn test_large_export_is_offloaded() {
    let executor = Arc::new(BackgroundExecutor::new(2));
    let builder = TestGridBuilder::numbered(1_500).with_offload(executor.clone());
    let delivery = builder.delivery.clone();
    let mut grid = builder.build();
    let log = EventLog::attach(&grid);

    let outcome = grid.export_data(ExportFormat::Csv, None).unwrap();
    assert!(outcome.is_pending());
    assert!(delivery.files().is_empty(), "delivery waits for completion");

    assert!(drain_until(&executor, || !delivery.files().is_empty()));
    let files = delivery.files();
    assert_eq!(files[0].filename, outcome.filename());
    assert_eq!(files[0].content.lines().count(), 1_501);

    let completed = log.of_kind(EventKind::ExportCompleted);
    let [GridEvent::ExportCompleted { job, .. }] = completed.as_slice() else {
        panic!("expected one ExportCompleted, got {}", completed.len());
    };
    assert_eq!(*job, outcome.job());
}

#[test]
fn test_small_export_stays_inline_with_offload_present() {
    let executor = Arc::new(BackgroundExecutor::new(1));
    let mut grid = TestGridBuilder::people().with_offload(executor.clone()).build();
    let outcome = grid.export_data(ExportFormat::Csv, None).unwrap();
    assert!(!outcome.is_pending());
    assert!(!executor.has_pending());
}

#[test]
fn test_offloaded_output_matches_inline() {
    let mut inline = tricky_rows().build();
    let expected = inline_content(&mut inline);

    let executor = Arc::new(BackgroundExecutor::new(1));
    let builder = tricky_rows()
        .with_config(GridConfig::default().with_export_offload_threshold(0))
        .with_offload(executor.clone());
    let delivery = builder.delivery.clone();
    let mut offloaded = builder.build();

    assert!(offloaded.export_data(ExportFormat::Csv, None).unwrap().is_pending());
    assert!(drain_until(&executor, || !delivery.files().is_empty()));
    assert_eq!(delivery.files()[0].content, expected);
}

#[test]
fn test_concurrent_exports_are_independent_jobs() {
    let executor = Arc::new(BackgroundExecutor::new(2));
    let builder = TestGridBuilder::people()
        .with_config(GridConfig::default().with_export_offload_threshold(0))
        .with_offload(executor.clone());
    let delivery = builder.delivery.clone();
    let mut grid = builder.build();

    let first = grid.export_data(ExportFormat::Csv, None).unwrap();
    let second = grid.export_data(ExportFormat::Excel, None).unwrap();
    assert_ne!(first.job(), second.job());

    assert!(drain_until(&executor, || delivery.files().len() == 2));
    let mut formats: Vec<_> = delivery.files().iter().map(|f| f.format).collect();
    formats.sort_by_key(|f| f.extension());
    assert_eq!(formats, vec![ExportFormat::Csv, ExportFormat::Excel]);
}

#[test]
fn test_offload_without_results_pumped_stays_pending() {
    let executor = Arc::new(BackgroundExecutor::new(1));
    let offload: Arc<dyn TaskOffload> = executor.clone();
    let builder = TestGridBuilder::people()
        .with_config(GridConfig::default().with_export_offload_threshold(0))
        .with_offload(offload);
    let delivery = builder.delivery.clone();
    let mut grid = builder.build();

    grid.export_data(ExportFormat::Csv, None).unwrap();
    std::thread::sleep(Duration::from_millis(20));
    assert!(delivery.files().is_empty(), "completion runs only on process_results");
    assert!(executor.has_pending());
}

#[test]
fn test_exported_csv_reads_back_through_polars() {
    let dir = tempfile::tempdir().unwrap();
    let mut grid = DataGrid::builder("ledger")
        .columns(vec![
            ColumnSpec::new("Name", ValueType::Text),
            ColumnSpec::new("Note", ValueType::Text),
            ColumnSpec::new("Amount", ValueType::Number),
        ])
        .rows(vec![
            RawRecord::new(["Smith, John", "said \"hi\"", "12"]),
            RawRecord::new(["Ann", "plain", "7.5"]),
        ])
        .delivery(Arc::new(DirectoryDelivery::new(dir.path())))
        .build()
        .unwrap();

    let outcome = grid.export_data(ExportFormat::Csv, None).unwrap();
    let source = load_file(&dir.path().join(outcome.filename())).unwrap();

    let titles: Vec<_> = source.columns.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Name", "Note", "Amount"]);
    assert_eq!(source.columns[2].value_type, ValueType::Number);
    assert_eq!(source.records[0].cells, vec!["Smith, John", "said \"hi\"", "12"]);
    assert_eq!(source.records[1].cells, vec!["Ann", "plain", "7.5"]);
}
