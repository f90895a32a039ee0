//! Headless interactive data-grid engine.
//!
//! A [`DataGrid`] turns a static set of columns and rows into a searchable,
//! filterable, sortable, paginated, selectable, exportable table whose view
//! state survives restarts. Rendering is left to the host, which listens to
//! [`GridEvent`]s and reads the current page back from the grid.
//!
//! ```ignore
//! let mut grid = DataGrid::builder("users")
//!     .columns(vec![
//!         ColumnSpec::new("Name", ValueType::Text),
//!         ColumnSpec::new("Age", ValueType::Number),
//!     ])
//!     .rows(vec![RawRecord::new(["Bob", "30"]), RawRecord::new(["Ann", "25"])])
//!     .build()?;
//!
//! grid.sort("age")?;
//! for row in grid.current_page_data() {
//!     println!("{}", row.text("name"));
//! }
//! ```

pub mod background;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod grid;
pub mod notifications;
pub mod perf;
pub mod services;
pub mod storage;
pub mod timing;
pub mod types;

pub use config::GridConfig;
pub use error::{ExportError, GridError, GridResult, PersistenceError};
pub use events::{EventBus, EventKind, GridEvent, SubscriptionId};
pub use grid::{BulkOutcome, DataGrid, DataGridBuilder, ExportOutcome, Snapshot};
pub use types::{
    ColumnSpec, ExportFormat, FilterCriteria, FilterCriterion, FilterValue, RawRecord, RowIndex,
    SortDirection, ValueType,
};
