//! Test helpers and builders for reducing boilerplate in tests.
//!
//! This module provides:
//! - `TestGridBuilder` - Builder for grids over small in-memory tables
//! - `EventLog` - Captures every event a grid emits
//! - `RecordingDelivery` - File delivery that keeps what it was given
//! - Common fixtures (`people`, `numbered`)

#![allow(dead_code)]

use datagrid::notifications::{ToastManager, ToastVariant};
use datagrid::services::{Confirmation, DeliveredFile, FileDelivery, KeyValueStore, TaskOffload};
use datagrid::storage::MemoryStore;
use datagrid::{
    ColumnSpec, DataGrid, EventKind, GridConfig, GridEvent, RawRecord, RowIndex, ValueType,
};
use parking_lot::Mutex;
use std::sync::{Arc, Once};

// ============================================================================
// TestGridBuilder
// ============================================================================

/// Builder for test grids.
///
/// # Example
/// ```ignore
/// let mut grid = TestGridBuilder::people().with_page_size(10).build();
/// ```
pub struct TestGridBuilder {
    identifier: String,
    columns: Vec<ColumnSpec>,
    rows: Vec<RawRecord>,
    config: GridConfig,
    store: Arc<dyn KeyValueStore>,
    confirmation: Option<Arc<dyn Confirmation>>,
    offload: Option<Arc<dyn TaskOffload>>,
    pub toasts: Arc<Mutex<ToastManager>>,
    pub delivery: Arc<RecordingDelivery>,
}

impl TestGridBuilder {
    pub fn new(columns: Vec<ColumnSpec>, rows: Vec<RawRecord>) -> Self {
        Self {
            identifier: "test-grid".to_string(),
            columns,
            rows,
            config: GridConfig::default(),
            store: Arc::new(MemoryStore::new()),
            confirmation: None,
            offload: None,
            toasts: Arc::new(Mutex::new(ToastManager::new())),
            delivery: Arc::new(RecordingDelivery::default()),
        }
    }

    /// Bob(30), Ann(25), Cid(40) with `name` and `age` columns.
    pub fn people() -> Self {
        Self::new(people_columns(), people_rows())
    }

    /// `count` rows of `id` (1..=count) and `label` ("row 1", ...).
    pub fn numbered(count: usize) -> Self {
        Self::new(
            vec![
                ColumnSpec::new("Id", ValueType::Number),
                ColumnSpec::new("Label", ValueType::Text),
            ],
            (1..=count)
                .map(|i| RawRecord::new([i.to_string(), format!("row {}", i)]))
                .collect(),
        )
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn with_config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.config = self.config.with_page_size(page_size);
        if !self.config.page_size_choices.contains(&page_size) {
            self.config.page_size_choices.push(page_size);
        }
        self
    }

    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = store;
        self
    }

    /// Answer every confirmation with `answer`.
    pub fn confirming(mut self, answer: bool) -> Self {
        self.confirmation = Some(Arc::new(move |_: &str| answer));
        self
    }

    pub fn with_offload(mut self, offload: Arc<dyn TaskOffload>) -> Self {
        self.offload = Some(offload);
        self
    }

    pub fn build(self) -> DataGrid {
        self.try_build().expect("test grid should build")
    }

    pub fn try_build(self) -> datagrid::GridResult<DataGrid> {
        init_tracing();
        let mut builder = DataGrid::builder(self.identifier)
            .columns(self.columns)
            .rows(self.rows)
            .config(self.config)
            .store(self.store)
            .notifier(self.toasts)
            .delivery(self.delivery);
        if let Some(confirmation) = self.confirmation {
            builder = builder.confirmation(confirmation);
        }
        if let Some(offload) = self.offload {
            builder = builder.offload(offload);
        }
        builder.build()
    }
}

/// Route engine logs through the test harness. Levels come from `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn people_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("Name", ValueType::Text),
        ColumnSpec::new("Age", ValueType::Number),
    ]
}

pub fn people_rows() -> Vec<RawRecord> {
    vec![
        RawRecord::new(["Bob", "30"]),
        RawRecord::new(["Ann", "25"]),
        RawRecord::new(["Cid", "40"]),
    ]
}

/// Values of one column over the filtered rows, in view order.
pub fn column_values(grid: &DataGrid, key: &str) -> Vec<String> {
    grid.filtered_rows().map(|r| r.text(key).to_string()).collect()
}

pub fn indices(values: &[u64]) -> Vec<RowIndex> {
    values.iter().map(|&i| RowIndex(i)).collect()
}

// ============================================================================
// EventLog
// ============================================================================

const ALL_KINDS: &[EventKind] = &[
    EventKind::SortChanged,
    EventKind::FilterApplied,
    EventKind::PageChanged,
    EventKind::SelectionChanged,
    EventKind::BulkActionRequested,
    EventKind::ExportCompleted,
    EventKind::RowsDeleted,
    EventKind::ColumnResized,
    EventKind::ColumnVisibilityChanged,
];

/// Records every event a grid emits, in order.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<GridEvent>>>,
}

impl EventLog {
    pub fn attach(grid: &DataGrid) -> Self {
        let log = Self::default();
        for &kind in ALL_KINDS {
            let events = Arc::clone(&log.events);
            grid.on(kind, move |event| events.lock().push(event.clone()));
        }
        log
    }

    pub fn events(&self) -> Vec<GridEvent> {
        self.events.lock().clone()
    }

    pub fn of_kind(&self, kind: EventKind) -> Vec<GridEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

// ============================================================================
// Ports
// ============================================================================

/// Keeps every delivered file.
#[derive(Default)]
pub struct RecordingDelivery {
    files: Mutex<Vec<DeliveredFile>>,
}

impl RecordingDelivery {
    pub fn files(&self) -> Vec<DeliveredFile> {
        self.files.lock().clone()
    }
}

impl FileDelivery for RecordingDelivery {
    fn deliver(&self, file: &DeliveredFile) -> std::io::Result<()> {
        self.files.lock().push(file.clone());
        Ok(())
    }
}

/// Variants of every toast shown so far, oldest first.
pub fn toast_variants(toasts: &Mutex<ToastManager>) -> Vec<ToastVariant> {
    toasts.lock().toasts().iter().map(|t| t.variant).collect()
}
