//! Data ingestion and row sources
//!
//! This module turns host input into the engine's typed column model and
//! row records, and provides polars-backed loaders for CSV/TSV and JSON
//! files.
//!
//! ## Error Handling
//!
//! Ingestion itself never fails on cell content: malformed cells degrade to
//! safe defaults. Structural problems in the column list are reported as
//! [`crate::error::GridError`]. File loading returns `DataResult<T>`, which
//! uses the `DataError` type.

mod error;
pub mod ingest;
mod source;

pub use error::*;
pub use ingest::{build_columns, build_rows, derive_key, parse_cell};
pub use source::*;
