//! Pagination utilities for list operations
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs.

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    pub const MAX_PER_PAGE: u32 = 100;

    pub fn new(page: u32, per_page: u32) -> Self { Self { page, per_page } }

    /// Clamp to sane defaults and convert to a 0-based `(page_index, per_page)` pair.
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, Self::MAX_PER_PAGE);
        ((page - 1) as u64, per_page as u64)
    }

    /// Number of rows to skip for this page.
    pub fn offset(self) -> u64 {
        let (idx, per) = self.normalize();
        idx * per
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}
