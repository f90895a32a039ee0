//! Pagination over the filtered rows.

use super::DataGrid;
use crate::constants::PAGE_WINDOW_DELTA;
use crate::error::{GridError, GridResult};
use crate::events::GridEvent;
use crate::types::{PageToken, RowRecord};
use std::ops::Range;

/// Page position over a row count. Pages are 1-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationState {
    /// Current page (1-indexed)
    pub current_page: usize,
    /// Rows per page
    pub page_size: usize,
    /// Rows being paged (the filtered dataset)
    pub total_rows: usize,
}

impl PaginationState {
    pub fn new(page_size: usize, total_rows: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total_rows,
        }
    }

    /// At least one page, even with no rows
    pub fn total_pages(&self) -> usize {
        if self.total_rows == 0 {
            1
        } else {
            self.total_rows.div_ceil(self.page_size)
        }
    }

    pub fn can_go_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// Move to `page`. Out-of-range pages leave the state unchanged.
    /// Returns whether the page changed.
    pub fn go_to(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() || page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn set_page_size(&mut self, size: usize) {
        self.page_size = size.max(1);
        // Reset to first page when changing page size
        self.current_page = 1;
    }

    /// Update the row count, pulling the current page back into range.
    pub fn set_total_rows(&mut self, total_rows: usize) {
        self.total_rows = total_rows;
        self.current_page = self.current_page.clamp(1, self.total_pages());
    }

    /// Positions into the filtered rows shown on the current page
    pub fn visible_range(&self) -> Range<usize> {
        let start = ((self.current_page - 1) * self.page_size).min(self.total_rows);
        let end = (start + self.page_size).min(self.total_rows);
        start..end
    }
}

/// Page-number strip: first page, a window of `PAGE_WINDOW_DELTA` pages on
/// each side of `current`, and the last page, with ellipses over gaps.
///
/// `page_numbers(10, 5)` is `1 … 3 4 5 6 7 … 10`.
pub fn page_numbers(total_pages: usize, current_page: usize) -> Vec<PageToken> {
    let total = total_pages.max(1);
    let current = current_page.clamp(1, total);
    let start = current.saturating_sub(PAGE_WINDOW_DELTA).max(1);
    let end = (current + PAGE_WINDOW_DELTA).min(total);

    let mut tokens = vec![PageToken::Page(1)];
    if start > 2 {
        tokens.push(PageToken::Ellipsis);
    }
    tokens.extend(
        (start..=end)
            .filter(|&page| page != 1 && page != total)
            .map(PageToken::Page),
    );
    if end + 1 < total {
        tokens.push(PageToken::Ellipsis);
    }
    if total > 1 {
        tokens.push(PageToken::Page(total));
    }
    tokens
}

/// Status line such as "Showing 11-20 of 57"
pub fn format_position(range: &Range<usize>, total: usize) -> String {
    if total == 0 || range.is_empty() {
        return format!("Showing 0 of {}", total);
    }
    format!("Showing {}-{} of {}", range.start + 1, range.end, total)
}

/// Format row count with thousands separator (e.g., "1.2K rows")
pub fn format_row_count(count: usize) -> String {
    let formatted = if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    };

    if count == 1 {
        format!("{} row", formatted)
    } else {
        format!("{} rows", formatted)
    }
}

impl DataGrid {
    /// Go to page `n`. Out-of-range pages are ignored. Returns whether the
    /// page changed.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if !self.pagination.go_to(page) {
            tracing::trace!(page, total_pages = self.pagination.total_pages(), "Page unchanged");
            return false;
        }
        self.emit_page_changed();
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.pagination.current_page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.go_to_page(self.pagination.current_page.saturating_sub(1))
    }

    pub fn first_page(&mut self) -> bool {
        self.go_to_page(1)
    }

    pub fn last_page(&mut self) -> bool {
        self.go_to_page(self.pagination.total_pages())
    }

    /// Change rows per page. The size must be one of the configured choices.
    pub fn set_page_size(&mut self, size: usize) -> GridResult<()> {
        if !self.config.allows_page_size(size) {
            return Err(GridError::InvalidPageSize { size });
        }
        self.pagination.set_page_size(size);
        tracing::debug!(grid = %self.identifier, size, "Page size changed");
        self.persist();
        self.emit_page_changed();
        Ok(())
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn current_page(&self) -> usize {
        self.pagination.current_page
    }

    pub fn page_size(&self) -> usize {
        self.pagination.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages()
    }

    /// Rows on the current page, in view order
    pub fn current_page_data(&self) -> Vec<&RowRecord> {
        self.filtered[self.pagination.visible_range()]
            .iter()
            .map(|&pos| &self.rows[pos])
            .collect()
    }

    /// Page-number strip for the current position
    pub fn page_numbers(&self) -> Vec<PageToken> {
        page_numbers(self.pagination.total_pages(), self.pagination.current_page)
    }

    pub fn position_label(&self) -> String {
        format_position(&self.pagination.visible_range(), self.filtered.len())
    }

    pub(crate) fn emit_page_changed(&self) {
        self.events.emit(GridEvent::PageChanged {
            page: self.pagination.current_page,
            total_pages: self.pagination.total_pages(),
        });
    }
}
