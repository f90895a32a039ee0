//! Column widths and visibility.

use super::DataGrid;
use crate::constants::{MIN_COLUMN_WIDTH, MIN_CONTAINER_WIDTH, TABLE_OVERHEAD};
use crate::data::ingest::clamp_column_width;
use crate::error::{GridError, GridResult};
use crate::events::GridEvent;
use std::time::Instant;

/// Resolved width of one visible column
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnLayout {
    pub key: String,
    pub width: f32,
    /// Width was set explicitly rather than fitted
    pub explicit: bool,
}

impl DataGrid {
    /// Set an explicit column width, clamped to `MIN_COLUMN_WIDTH`.
    /// Returns the width applied.
    pub fn resize_column(&mut self, key: &str, width: f32) -> GridResult<f32> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.key == key)
            .ok_or_else(|| GridError::UnknownColumn { key: key.to_string() })?;

        let width = clamp_column_width(width);
        column.width = Some(width);

        tracing::debug!(grid = %self.identifier, column = key, width, "Column resized");
        self.persist();
        self.events.emit(GridEvent::ColumnResized {
            column: key.to_string(),
            width,
        });
        Ok(width)
    }

    pub fn set_column_visible(&mut self, key: &str, visible: bool) -> GridResult<()> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.key == key)
            .ok_or_else(|| GridError::UnknownColumn { key: key.to_string() })?;

        if column.visible == visible {
            return Ok(());
        }
        column.visible = visible;

        self.events.emit(GridEvent::ColumnVisibilityChanged {
            column: key.to_string(),
            visible,
        });
        Ok(())
    }

    /// Report a container width change. Bursts are throttled; the last
    /// width of a burst is applied by `poll_timers`. Returns whether the
    /// width was applied immediately.
    pub fn set_container_width(&mut self, width: f32, now: Instant) -> bool {
        match self.resize_throttle.offer(width, now) {
            Some(width) => {
                self.apply_container_width(width);
                true
            }
            None => false,
        }
    }

    pub fn container_width(&self) -> Option<f32> {
        self.container_width
    }

    /// Widths for the visible columns. Columns without an explicit width
    /// share what the explicit ones leave of the container.
    pub fn column_layout(&self) -> Vec<ColumnLayout> {
        let visible: Vec<_> = self.visible_columns().collect();
        let explicit_total: f32 = visible.iter().filter_map(|c| c.width).sum();
        let flexible = visible.iter().filter(|c| c.width.is_none()).count();

        let fitted = match self.container_width {
            Some(container) if flexible > 0 => {
                let available = (container - TABLE_OVERHEAD).max(MIN_CONTAINER_WIDTH);
                ((available - explicit_total) / flexible as f32).max(MIN_COLUMN_WIDTH)
            }
            _ => MIN_COLUMN_WIDTH,
        };

        visible
            .into_iter()
            .map(|c| ColumnLayout {
                key: c.key.clone(),
                width: c.width.unwrap_or(fitted),
                explicit: c.width.is_some(),
            })
            .collect()
    }

    pub(crate) fn apply_container_width(&mut self, width: f32) {
        if self
            .container_width
            .is_some_and(|current| (current - width).abs() < 1.0)
        {
            return;
        }
        self.container_width = Some(width);
        tracing::trace!(grid = %self.identifier, width, "Container resized");
    }
}
