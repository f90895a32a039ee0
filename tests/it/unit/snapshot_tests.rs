//! Snapshot tests using the insta crate.
//!
//! These pin the serialized shapes hosts depend on: the persisted grid
//! snapshot, filter criteria and emitted events.
//!
//! To update snapshots after intentional changes:
//! ```sh
//! cargo insta test --accept
//! ```

use crate::helpers::{EventLog, TestGridBuilder};
use chrono::NaiveDate;
use datagrid::{EventKind, ExportFormat, FilterCriteria, FilterCriterion, FilterValue};

#[test]
fn snapshot_persisted_grid_state() {
    let mut grid = TestGridBuilder::people().build();
    grid.set_page_size(10).unwrap();
    grid.sort("age").unwrap();
    grid.sort("age").unwrap();
    grid.apply_filters(FilterCriteria::from([(
        "age".to_string(),
        FilterCriterion::min(26.5),
    )]));
    grid.resize_column("name", 120.5).unwrap();

    insta::assert_json_snapshot!(grid.snapshot(), @r#"
    {
      "sort": {
        "column": "age",
        "direction": "desc"
      },
      "page_size": 10,
      "filters": {
        "age": {
          "type": "range",
          "min": 26.5,
          "max": null
        }
      },
      "column_widths": {
        "name": 120.5
      }
    }
    "#);
}

#[test]
fn snapshot_filter_criteria_shapes() {
    let criteria = vec![
        FilterCriterion::contains("ann"),
        FilterCriterion::equals(FilterValue::Text("open".into())),
        FilterCriterion::equals(FilterValue::Bool(true)),
        FilterCriterion::between(1.5, 9.5),
        FilterCriterion::date_range(NaiveDate::from_ymd_opt(2024, 1, 1), None),
    ];

    insta::assert_json_snapshot!(criteria, @r#"
    [
      {
        "type": "contains",
        "value": "ann"
      },
      {
        "type": "equals",
        "value": "open"
      },
      {
        "type": "equals",
        "value": true
      },
      {
        "type": "range",
        "min": 1.5,
        "max": 9.5
      },
      {
        "type": "date_range",
        "from": "2024-01-01",
        "to": null
      }
    ]
    "#);
}

#[test]
fn snapshot_sort_and_page_events() {
    let grid_builder = TestGridBuilder::numbered(5).with_page_size(2);
    let mut grid = grid_builder.build();
    let log = EventLog::attach(&grid);

    grid.sort("label").unwrap();
    grid.go_to_page(3);

    insta::assert_json_snapshot!(log.events(), @r#"
    [
      {
        "event": "sort_changed",
        "column": "label",
        "direction": "asc"
      },
      {
        "event": "page_changed",
        "page": 3,
        "total_pages": 3
      }
    ]
    "#);
}

#[test]
fn snapshot_export_completed_event() {
    let mut grid = TestGridBuilder::people().build();
    let log = EventLog::attach(&grid);
    grid.export_data(ExportFormat::Csv, None).unwrap();

    let events = log.of_kind(EventKind::ExportCompleted);
    insta::assert_json_snapshot!(events, {
        "[].job" => "[job]",
        "[].filename" => "[filename]",
    }, @r#"
    [
      {
        "event": "export_completed",
        "job": "[job]",
        "format": "csv",
        "content": "Name,Age\nBob,30\nAnn,25\nCid,40\n",
        "filename": "[filename]"
      }
    ]
    "#);
}
