//! Engine-wide constants.
//!
//! Centralizes default configuration values and layout numbers so the
//! engine modules stay free of magic numbers.

// ============================================================================
// Pagination
// ============================================================================

/// Page size used when the host does not configure one
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Page size options offered by the page size selector
pub const PAGE_SIZE_OPTIONS: &[usize] = &[10, 25, 50, 100];

/// Pages shown on each side of the current page in the page-number strip
pub const PAGE_WINDOW_DELTA: usize = 2;

// ============================================================================
// Search
// ============================================================================

/// Queries shorter than this (in characters) clear the active search
pub const DEFAULT_MIN_SEARCH_LENGTH: usize = 2;

// ============================================================================
// Timing
// ============================================================================

/// Search input debounce delay in milliseconds
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Container resize throttle interval in milliseconds
pub const RESIZE_THROTTLE_MS: u64 = 250;

// ============================================================================
// Export
// ============================================================================

/// Row count above which CSV serialization is handed to the offload port
pub const EXPORT_OFFLOAD_THRESHOLD: usize = 1_000;

/// Field separator for CSV output
pub const CSV_SEPARATOR: char = ',';

/// MIME type for CSV downloads
pub const CSV_MIME: &str = "text/csv;charset=utf-8";

/// MIME type for the Excel-compatible download
pub const EXCEL_MIME: &str = "application/vnd.ms-excel";

// ============================================================================
// Persistence
// ============================================================================

/// Prefix for snapshot keys in the key-value store
pub const STORAGE_KEY_PREFIX: &str = "datagrid:";

/// Directory name (under the platform data dir) for the file-backed store
pub const STORAGE_DIR_NAME: &str = "datagrid";

// ============================================================================
// Column Layout
// ============================================================================

/// Narrowest width a column can be resized or fitted to
pub const MIN_COLUMN_WIDTH: f32 = 60.0;

/// Container width consumed by borders before columns are fitted
pub const TABLE_OVERHEAD: f32 = 4.0;

/// Smallest usable container width for fitting
pub const MIN_CONTAINER_WIDTH: f32 = 100.0;

// ============================================================================
// Row Sources
// ============================================================================

/// Maximum number of rows loaded from a CSV/JSON source
pub const MAX_SOURCE_ROWS: usize = 100_000;

/// Rows sampled by polars for schema inference
pub const SCHEMA_INFER_ROWS: usize = 1_000;

// ============================================================================
// Background Work
// ============================================================================

/// Worker threads started by `BackgroundExecutor::with_default_workers`
pub const DEFAULT_WORKER_COUNT: usize = 2;
