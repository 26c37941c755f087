//! Page requests and page results for offset pagination.

use serde::{Deserialize, Serialize};

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// A `(page, page_size)` request, both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Creates a page request, clamping both values to at least 1.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// The 1-based page number.
    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Offset of the first record of the page, or `None` if it overflows.
    pub fn offset(&self) -> Option<u64> {
        (self.page - 1).checked_mul(self.page_size)
    }
}

/// One page of records together with the counts describing the whole
/// result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    /// Number of records matching the query across all pages.
    pub total_count: u64,
    /// `ceil(total_count / page_size)`; zero for an empty result.
    pub page_count: u64,
    /// The requested page, not clamped against `page_count`.
    pub current_page: u64,
    pub page_size: u64,
}

impl<T> PageResult<T> {
    /// Builds a page result from a request, the total and the slice.
    pub fn new(request: PageRequest, total_count: u64, items: Vec<T>) -> Self {
        Self {
            items,
            total_count,
            page_count: total_count.div_ceil(request.page_size()),
            current_page: request.page(),
            page_size: request.page_size(),
        }
    }

    /// The last page number, never below 1.
    pub fn last_page(&self) -> u64 {
        self.page_count.max(1)
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page()
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// `current_page + 1` when a next page exists.
    pub fn next_page(&self) -> Option<u64> {
        self.has_next().then(|| self.current_page + 1)
    }

    /// `current_page - 1` when a previous page exists.
    pub fn prev_page(&self) -> Option<u64> {
        self.has_prev().then(|| self.current_page - 1)
    }

    /// Maps the items, keeping the counts.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_count: self.page_count,
            current_page: self.current_page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), 1);
        assert_eq!(req.offset(), Some(0));
    }

    #[test]
    fn test_offset_overflow() {
        assert_eq!(PageRequest::new(u64::MAX, 10).offset(), None);
        assert_eq!(PageRequest::new(3, 10).offset(), Some(20));
    }

    #[test]
    fn test_page_counts() {
        let result: PageResult<u8> = PageResult::new(PageRequest::new(2, 1), 2, vec![1]);
        assert_eq!(result.page_count, 2);
        assert_eq!(result.last_page(), 2);
        assert!(result.has_prev());
        assert!(!result.has_next());
        assert_eq!(result.prev_page(), Some(1));
        assert_eq!(result.next_page(), None);
    }

    #[test]
    fn test_empty_result_reports_one_page() {
        let result: PageResult<u8> = PageResult::new(PageRequest::default(), 0, vec![]);
        assert_eq!(result.page_count, 0);
        assert_eq!(result.last_page(), 1);
        assert!(!result.has_next());
        assert!(!result.has_prev());
    }

    #[test]
    fn test_over_paging_keeps_current_page() {
        let result: PageResult<u8> = PageResult::new(PageRequest::new(9999, 10), 3, vec![]);
        assert_eq!(result.current_page, 9999);
        assert_eq!(result.last_page(), 1);
        assert!(!result.has_next());
        assert_eq!(result.prev_page(), Some(9998));
    }
}
