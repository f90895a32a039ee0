//! Error types for the grid engine.
//!
//! Only initialization preconditions and caller mistakes (unknown columns,
//! page sizes outside the allow-list) surface as `GridError`. Recoverable
//! conditions such as malformed cells, unreadable snapshots and declined
//! confirmations are handled inside the engine.

use crate::types::ExportFormat;
use thiserror::Error;

/// Errors returned by grid construction and operations
#[derive(Error, Debug, PartialEq)]
pub enum GridError {
    /// Column list is empty
    #[error("No columns defined")]
    NoColumns,

    /// Column key could not be derived from the title
    #[error("Column {title:?} has no usable key")]
    MissingColumnKey { title: String },

    /// Two columns share a key
    #[error("Duplicate column key: {key}")]
    DuplicateColumnKey { key: String },

    /// Configuration values out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation named a column that does not exist
    #[error("Unknown column: {key}")]
    UnknownColumn { key: String },

    /// Sort requested on a column that is not sortable
    #[error("Column is not sortable: {key}")]
    NotSortable { key: String },

    /// Page size outside the configured allow-list
    #[error("Page size {size} is not one of the configured choices")]
    InvalidPageSize { size: usize },

    /// Export could not be produced
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Result type alias for grid operations
pub type GridResult<T> = Result<T, GridError>;

/// Errors produced by the export engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// Format needs a rendering capability the engine does not have
    #[error("{format} export is not supported")]
    Unsupported { format: ExportFormat },
}

/// Snapshot read/write failures. Logged and recovered, never returned to hosts.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
