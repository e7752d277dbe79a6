//! Pagination state.

use crate::error::{GridError, GridResult};

/// Page sizes offered when the caller does not supply its own set.
pub const DEFAULT_PAGE_SIZES: [u32; 3] = [3, 5, 10];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationController {
    page: u32,
    page_size: u32,
    allowed: Vec<u32>,
    total_pages: Option<u32>,
}

impl PaginationController {
    pub fn new(default_page_size: u32) -> GridResult<Self> {
        Self::with_allowed(default_page_size, DEFAULT_PAGE_SIZES)
    }

    /// Build with a custom set of allowed page sizes.
    ///
    /// The set is sorted and deduplicated; zero is rejected, and the default
    /// size must be a member.
    pub fn with_allowed<I>(default_page_size: u32, allowed: I) -> GridResult<Self>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut allowed: Vec<u32> = allowed.into_iter().collect();
        allowed.sort_unstable();
        allowed.dedup();

        if allowed.is_empty() || allowed.contains(&0) {
            return Err(GridError::InvalidSpec {
                reason: "page sizes must be a non-empty set of positive integers".to_string(),
            });
        }
        if !allowed.contains(&default_page_size) {
            return Err(GridError::PageSizeNotAllowed {
                size: default_page_size,
                allowed,
            });
        }

        Ok(Self {
            page: 1,
            page_size: default_page_size,
            allowed,
            total_pages: None,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn allowed_sizes(&self) -> &[u32] {
        &self.allowed
    }

    /// Total pages reported by the server, once known.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// Move to page `n`, clamped to `[1, total_pages]` when the total is known.
    /// Returns whether the page changed.
    pub fn set_page(&mut self, n: u32) -> bool {
        let upper = self.total_pages.map(|t| t.max(1)).unwrap_or(u32::MAX);
        let next = n.clamp(1, upper);
        if next == self.page {
            return false;
        }
        self.page = next;
        true
    }

    /// Change the page size. Resets to page 1. Returns whether the request
    /// changed.
    pub fn set_page_size(&mut self, size: u32) -> GridResult<bool> {
        if !self.allowed.contains(&size) {
            return Err(GridError::PageSizeNotAllowed {
                size,
                allowed: self.allowed.clone(),
            });
        }
        if size == self.page_size && self.page == 1 {
            return Ok(false);
        }
        self.page_size = size;
        self.restart();
        Ok(true)
    }

    /// Advance to the next allowed size, wrapping around. Resets to page 1.
    /// Returns whether the request changed.
    pub fn cycle_page_size(&mut self) -> bool {
        let index = self
            .allowed
            .iter()
            .position(|s| *s == self.page_size)
            .map(|i| (i + 1) % self.allowed.len())
            .unwrap_or(0);
        let size = self.allowed[index];
        if size == self.page_size && self.page == 1 {
            return false;
        }
        self.page_size = size;
        self.restart();
        true
    }

    pub fn next_page(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.set_page(self.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> bool {
        if !self.can_prev() {
            return false;
        }
        self.set_page(self.page - 1)
    }

    /// Go back to page 1 for a new result set. A known total falls back to a
    /// single page until the server reports the new one, so paging ahead of
    /// the response is not possible.
    pub fn restart(&mut self) -> bool {
        let moved = self.page != 1;
        self.page = 1;
        if self.total_pages.is_some() {
            self.total_pages = Some(1);
        }
        moved
    }

    /// Record the server's total. A page past the new total is pulled back to
    /// the last page; returns whether that happened.
    pub fn set_total_pages(&mut self, total_pages: u32) -> bool {
        self.total_pages = Some(total_pages);
        let upper = total_pages.max(1);
        if self.page > upper {
            self.page = upper;
            return true;
        }
        false
    }

    pub fn can_prev(&self) -> bool {
        self.page > 1
    }

    /// Unknown totals are optimistic: the server decides whether a page exists.
    pub fn can_next(&self) -> bool {
        match self.total_pages {
            Some(total) => self.page < total,
            None => true,
        }
    }
}
