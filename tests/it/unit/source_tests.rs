//! Unit tests for file-backed row sources.

use crate::helpers::column_values;
use datagrid::data::{DataError, load_file};
use datagrid::{DataGrid, FilterCriteria, FilterCriterion, ValueType};
use std::io::Write;
use tempfile::NamedTempFile;

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_grid_from_csv_source() {
    let file = temp_file(
        ".csv",
        "Full Name,Score,Joined\n\"Smith, John\",12,2024-01-05\nAnn,7,2023-11-30\n",
    );
    let source = load_file(file.path()).unwrap();
    assert_eq!(source.columns[1].value_type, ValueType::Number);

    let mut grid = DataGrid::builder("scores").source(source).build().unwrap();
    assert_eq!(grid.column("full-name").map(|c| c.title.as_str()), Some("Full Name"));

    grid.sort("score").unwrap();
    assert_eq!(column_values(&grid, "full-name"), vec!["Ann", "Smith, John"]);

    grid.apply_filters(FilterCriteria::from([(
        "score".to_string(),
        FilterCriterion::min(10.0),
    )]));
    assert_eq!(column_values(&grid, "full-name"), vec!["Smith, John"]);
}

#[test]
fn test_grid_from_tsv_source() {
    let file = temp_file(".tsv", "name\tcity\nAnn\tOslo\nBob\tLima\n");
    let source = load_file(file.path()).unwrap();
    assert_eq!(source.row_count(), 2);

    let mut grid = DataGrid::builder("cities").source(source).build().unwrap();
    grid.search("lima");
    assert_eq!(column_values(&grid, "name"), vec!["Bob"]);
}

#[test]
fn test_grid_from_json_source() {
    let file = temp_file(
        ".json",
        r#"[{"item":"pen","qty":3,"ok":true},{"item":"ink","qty":10,"ok":false}]"#,
    );
    let source = load_file(file.path()).unwrap();
    let types: Vec<_> = source.columns.iter().map(|c| c.value_type).collect();
    assert_eq!(types, vec![ValueType::Text, ValueType::Number, ValueType::Boolean]);

    let mut grid = DataGrid::builder("stock").source(source).build().unwrap();
    grid.sort("qty").unwrap();
    grid.sort("qty").unwrap();
    assert_eq!(column_values(&grid, "item"), vec!["ink", "pen"]);
}

#[test]
fn test_header_only_csv_builds_empty_grid() {
    let file = temp_file(".csv", "a,b\n");
    let source = load_file(file.path()).unwrap();
    let grid = DataGrid::builder("empty").source(source).build().unwrap();
    assert_eq!(grid.filtered_len(), 0);
    assert_eq!(grid.total_pages(), 1);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_file(&dir.path().join("absent.csv"));
    assert!(matches!(result, Err(DataError::Io(_))));
}
