//! Unit tests for the grid engine.

mod background_tests;
mod export_tests;
mod snapshot_tests;
mod source_tests;
