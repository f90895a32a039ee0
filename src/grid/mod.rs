//! The grid engine.
//!
//! A [`DataGrid`] owns one table's full dataset and all interactive state:
//! search and filter criteria, sort, pagination, selection and column
//! layout. Operations take `&mut self` and run to completion; collaborators
//! (confirmation, notifications, storage, file delivery, export offload) are
//! reached only through the ports in [`crate::services`].
//!
//! The operations are split by concern:
//! - `filter`: search, criteria, debounced input, recompute
//! - `sort`: single-column stable sort
//! - `pagination`: page navigation and the page-number strip
//! - `selection`: row selection and bulk actions
//! - `export`: CSV/Excel export, inline or offloaded
//! - `persistence`: snapshot save/restore
//! - `layout`: column widths, visibility and container fitting

mod export;
mod filter;
mod layout;
mod pagination;
mod persistence;
mod selection;
mod sort;

pub use export::ExportOutcome;
pub use filter::criterion_matches;
pub use layout::ColumnLayout;
pub use pagination::{PaginationState, format_position, format_row_count, page_numbers};
pub use persistence::Snapshot;
pub use selection::BulkOutcome;

use crate::config::GridConfig;
use crate::data::{RowSource, build_columns, build_rows};
use crate::error::{GridError, GridResult};
use crate::events::{EventBus, EventKind, GridEvent, SubscriptionId};
use crate::perf::GridMetrics;
use crate::services::{
    Confirmation, FileDelivery, GridServices, KeyValueStore, Notifier, TaskOffload,
};
use crate::timing::{Debouncer, Throttle};
use crate::types::{
    ColumnDescriptor, ColumnSpec, FilterCriteria, RawRecord, RowIndex, RowRecord, SortState,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct DataGrid {
    identifier: String,
    config: GridConfig,
    columns: Vec<ColumnDescriptor>,
    /// Full dataset, ascending by row index
    rows: Vec<RowRecord>,
    /// Positions into `rows` that pass search and criteria, in view order
    filtered: Vec<usize>,
    search_query: Option<String>,
    filters: FilterCriteria,
    sort: SortState,
    pagination: PaginationState,
    selection: BTreeSet<RowIndex>,
    container_width: Option<f32>,
    search_debounce: Debouncer<String>,
    resize_throttle: Throttle<f32>,
    services: GridServices,
    events: EventBus,
    /// Set by `destroy`; late export completions check it
    detached: Arc<AtomicBool>,
    metrics: GridMetrics,
}

impl std::fmt::Debug for DataGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid")
            .field("identifier", &self.identifier)
            .field("columns", &self.columns.len())
            .field("rows", &self.rows.len())
            .field("filtered", &self.filtered.len())
            .field("sort", &self.sort)
            .field("pagination", &self.pagination)
            .finish_non_exhaustive()
    }
}

impl DataGrid {
    pub fn builder(identifier: impl Into<String>) -> DataGridBuilder {
        DataGridBuilder::new(identifier)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.visible)
    }

    /// Full dataset in ingestion order
    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn row(&self, index: RowIndex) -> Option<&RowRecord> {
        self.position_of(index).map(|pos| &self.rows[pos])
    }

    /// Filtered dataset in view order
    pub fn filtered_rows(&self) -> impl Iterator<Item = &RowRecord> {
        self.filtered.iter().map(|&pos| &self.rows[pos])
    }

    pub fn filtered_indices(&self) -> Vec<RowIndex> {
        self.filtered_rows().map(|r| r.index).collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to one kind of grid event.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&GridEvent) + Send + Sync + 'static,
    {
        self.events.on(kind, handler)
    }

    pub fn off(&self, id: SubscriptionId) -> bool {
        self.events.off(id)
    }

    pub fn metrics(&self) -> &GridMetrics {
        &self.metrics
    }

    /// Tear the grid down: pending timers are dropped, subscribers are
    /// removed and in-flight exports complete without touching any port.
    pub fn destroy(mut self) {
        self.search_debounce.cancel();
        self.resize_throttle.cancel();
        self.detached.store(true, Ordering::SeqCst);
        self.events.clear();
        self.metrics.log_summary();
        tracing::debug!(grid = %self.identifier, "Grid destroyed");
    }

    /// Position of a row in the full dataset. Rows stay sorted by index.
    pub(crate) fn position_of(&self, index: RowIndex) -> Option<usize> {
        self.rows.binary_search_by_key(&index, |r| r.index).ok()
    }

    pub(crate) fn notifier(&self) -> &dyn Notifier {
        self.services.notifier.as_ref()
    }
}

/// Builder for [`DataGrid`].
///
/// Ports that are not supplied fall back to [`GridServices::default`].
pub struct DataGridBuilder {
    identifier: String,
    columns: Vec<ColumnSpec>,
    rows: Vec<RawRecord>,
    config: GridConfig,
    services: GridServices,
}

impl DataGridBuilder {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            config: GridConfig::default(),
            services: GridServices::default(),
        }
    }

    pub fn columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.columns = columns;
        self
    }

    pub fn rows(mut self, rows: Vec<RawRecord>) -> Self {
        self.rows = rows;
        self
    }

    /// Columns and rows loaded from a file
    pub fn source(mut self, source: RowSource) -> Self {
        self.columns = source.columns;
        self.rows = source.records;
        self
    }

    pub fn config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self
    }

    pub fn services(mut self, services: GridServices) -> Self {
        self.services = services;
        self
    }

    pub fn confirmation(mut self, confirmation: Arc<dyn Confirmation>) -> Self {
        self.services.confirmation = confirmation;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.services.notifier = notifier;
        self
    }

    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.services.store = store;
        self
    }

    pub fn delivery(mut self, delivery: Arc<dyn FileDelivery>) -> Self {
        self.services.delivery = delivery;
        self
    }

    pub fn offload(mut self, offload: Arc<dyn TaskOffload>) -> Self {
        self.services.offload = Some(offload);
        self
    }

    /// Ingest columns and rows, restore any saved snapshot and compute the
    /// initial view.
    pub fn build(self) -> GridResult<DataGrid> {
        let identifier = self.identifier.trim().to_string();
        if identifier.is_empty() {
            return Err(GridError::InvalidConfig("identifier must not be empty".into()));
        }
        self.config.validate()?;

        let columns = build_columns(self.columns)?;
        let rows = build_rows(&columns, self.rows);
        let filtered: Vec<usize> = (0..rows.len()).collect();
        let pagination = PaginationState::new(self.config.page_size, filtered.len());

        let mut grid = DataGrid {
            identifier,
            search_debounce: Debouncer::new(self.config.debounce_delay()),
            resize_throttle: Throttle::new(self.config.resize_throttle()),
            config: self.config,
            columns,
            rows,
            filtered,
            search_query: None,
            filters: FilterCriteria::new(),
            sort: SortState::default(),
            pagination,
            selection: BTreeSet::new(),
            container_width: None,
            services: self.services,
            events: EventBus::new(),
            detached: Arc::new(AtomicBool::new(false)),
            metrics: GridMetrics::new(),
        };

        grid.restore();

        tracing::debug!(
            grid = %grid.identifier,
            columns = grid.columns.len(),
            rows = grid.rows.len(),
            "Grid built"
        );
        Ok(grid)
    }
}
