//! Grid configuration.
//!
//! Hosts can build a `GridConfig` in code or deserialize it from JSON; every
//! field is optional in JSON and falls back to the defaults in
//! [`crate::constants`].

use crate::constants::{
    CSV_SEPARATOR, DEFAULT_MIN_SEARCH_LENGTH, DEFAULT_PAGE_SIZE, EXPORT_OFFLOAD_THRESHOLD,
    PAGE_SIZE_OPTIONS, RESIZE_THROTTLE_MS, SEARCH_DEBOUNCE_MS,
};
use crate::error::{GridError, GridResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Rows per page at startup
    pub page_size: usize,
    /// Allowed values for `set_page_size`
    pub page_size_choices: Vec<usize>,
    /// Delay applied to `queue_search`
    pub debounce_delay_ms: u64,
    /// Minimum interval between layout recomputes on container resize
    pub resize_throttle_ms: u64,
    pub case_sensitive_search: bool,
    /// Shorter queries clear the search
    pub min_search_length: usize,
    /// Write snapshots to the key-value store
    pub persist_state: bool,
    /// Exports with more rows than this go to the offload port, if any
    pub export_offload_threshold: usize,
    pub csv_separator: char,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_size_choices: PAGE_SIZE_OPTIONS.to_vec(),
            debounce_delay_ms: SEARCH_DEBOUNCE_MS,
            resize_throttle_ms: RESIZE_THROTTLE_MS,
            case_sensitive_search: false,
            min_search_length: DEFAULT_MIN_SEARCH_LENGTH,
            persist_state: true,
            export_offload_threshold: EXPORT_OFFLOAD_THRESHOLD,
            csv_separator: CSV_SEPARATOR,
        }
    }
}

impl GridConfig {
    /// Parse a config from JSON, filling omitted fields with defaults.
    pub fn from_json(json: &str) -> GridResult<Self> {
        let config: GridConfig = serde_json::from_str(json)
            .map_err(|e| GridError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_page_size_choices(mut self, choices: Vec<usize>) -> Self {
        self.page_size_choices = choices;
        self
    }

    pub fn with_persist_state(mut self, persist: bool) -> Self {
        self.persist_state = persist;
        self
    }

    pub fn with_case_sensitive_search(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive_search = case_sensitive;
        self
    }

    pub fn with_export_offload_threshold(mut self, rows: usize) -> Self {
        self.export_offload_threshold = rows;
        self
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }

    pub fn resize_throttle(&self) -> Duration {
        Duration::from_millis(self.resize_throttle_ms)
    }

    /// Whether `size` is an accepted page size. An empty choice list accepts
    /// any positive size.
    pub fn allows_page_size(&self, size: usize) -> bool {
        size > 0 && (self.page_size_choices.is_empty() || self.page_size_choices.contains(&size))
    }

    /// Check the values the engine relies on.
    pub fn validate(&self) -> GridResult<()> {
        if self.page_size == 0 {
            return Err(GridError::InvalidConfig("page_size must be positive".into()));
        }
        if self.page_size_choices.iter().any(|&n| n == 0) {
            return Err(GridError::InvalidConfig(
                "page_size_choices must be positive".into(),
            ));
        }
        if !self.allows_page_size(self.page_size) {
            return Err(GridError::InvalidConfig(format!(
                "page_size {} is not one of page_size_choices",
                self.page_size
            )));
        }
        if self.csv_separator == '"' || self.csv_separator == '\n' || self.csv_separator == '\r' {
            return Err(GridError::InvalidConfig(format!(
                "csv_separator {:?} conflicts with quoting",
                self.csv_separator
            )));
        }
        Ok(())
    }
}
