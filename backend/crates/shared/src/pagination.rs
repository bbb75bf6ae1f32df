//! Page-number pagination
//!
//! Every list endpoint answers `{count, next, previous, results}` where
//! `next`/`previous` are page numbers.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw `?page=&page_size=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Normalized page request: `page >= 1`, `1 <= page_size <= MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    /// A page past the end is invalid; page 1 is always valid.
    pub fn is_out_of_range(&self, total: u64) -> bool {
        self.page > 1 && (self.offset() as u64) >= total
    }
}

impl From<PageParams> for PageRequest {
    fn from(params: PageParams) -> Self {
        Self::new(params.page, params.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, total: u64, request: PageRequest) -> Self {
        let seen = request.offset() as u64 + results.len() as u64;
        Self {
            count: total,
            next: (seen < total).then(|| request.page() + 1),
            previous: (request.page() > 1).then(|| request.page() - 1),
            results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_and_clamping() {
        let req = PageRequest::new(None, None);
        assert_eq!((req.page(), req.page_size()), (1, DEFAULT_PAGE_SIZE));

        let req = PageRequest::new(Some(0), Some(1000));
        assert_eq!((req.page(), req.page_size()), (1, MAX_PAGE_SIZE));

        let req = PageRequest::new(Some(3), Some(20));
        assert_eq!(req.offset(), 40);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn test_out_of_range() {
        assert!(!PageRequest::new(Some(1), Some(10)).is_out_of_range(0));
        assert!(!PageRequest::new(Some(2), Some(10)).is_out_of_range(11));
        assert!(PageRequest::new(Some(2), Some(10)).is_out_of_range(10));
    }

    #[test]
    fn test_page_links() {
        let req = PageRequest::new(Some(2), Some(2));
        let page = Page::new(vec![3, 4], 5, req);
        assert_eq!(page.next, Some(3));
        assert_eq!(page.previous, Some(1));

        let last = Page::new(vec![5], 5, PageRequest::new(Some(3), Some(2)));
        assert_eq!(last.next, None);
        assert_eq!(last.map(|n| n * 10).results, vec![50]);
    }
}
