//! Pagination types for paged DAO reads.

use serde::{Deserialize, Serialize};

/// A request for one page of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// The page number (0-indexed).
    pub page: usize,
    /// The number of rows per page.
    pub size: usize,
}

impl PageRequest {
    /// The default page size.
    pub const DEFAULT_SIZE: usize = 20;
    /// The maximum allowed page size.
    pub const MAX_SIZE: usize = 100;

    /// Creates a new page request. `size` is clamped to `1..=MAX_SIZE`.
    #[must_use]
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page,
            size: size.clamp(1, Self::MAX_SIZE),
        }
    }

    /// The first page with the default size.
    #[must_use]
    pub fn first() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }

    /// The request for the page after this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            size: self.size,
        }
    }

    /// Row offset for `LIMIT .. OFFSET ..` queries. Saturates at `usize::MAX`.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }

    /// Row limit for `LIMIT .. OFFSET ..` queries.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// A page of results together with the total row count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// The rows on this page.
    pub content: Vec<T>,
    /// The page number (0-indexed).
    pub page: usize,
    /// The requested page size.
    pub size: usize,
    /// Total rows across all pages.
    pub total_elements: u64,
}

impl<T> Page<T> {
    /// Creates a new page.
    #[must_use]
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
        }
    }

    /// Total number of pages (`0` when there are no rows).
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size as u64)
    }

    /// Returns true if a page follows this one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        (self.page as u64 + 1) < self.total_pages()
    }

    /// Returns true if a page precedes this one.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 0
    }

    /// Returns true if the page holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of rows on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Maps the page content to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_offset() {
        let req = PageRequest::new(2, 10);
        assert_eq!(req.offset(), 20);
        assert_eq!(req.limit(), 10);
        assert_eq!(req.next().offset(), 30);
    }

    #[test]
    fn test_page_request_offset_saturates() {
        let req = PageRequest::new(usize::MAX / 2, 100);
        assert_eq!(req.offset(), usize::MAX);

        let last = PageRequest::new(usize::MAX, 10);
        assert_eq!(last.next().page, usize::MAX);
    }

    #[test]
    fn test_page_request_size_is_clamped() {
        assert_eq!(PageRequest::new(0, 1000).size, PageRequest::MAX_SIZE);
        assert_eq!(PageRequest::new(0, 0).size, 1);
        assert_eq!(PageRequest::default().size, PageRequest::DEFAULT_SIZE);
    }

    #[test]
    fn test_page_navigation() {
        let first: Page<i32> = Page::new(vec![1, 2, 3], PageRequest::new(0, 3), 7);
        assert_eq!(first.total_pages(), 3);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last: Page<i32> = Page::new(vec![7], PageRequest::new(2, 3), 7);
        assert!(!last.has_next());
        assert!(last.has_previous());
    }

    #[test]
    fn test_empty_page() {
        let page: Page<i32> = Page::new(Vec::new(), PageRequest::first(), 0);
        assert!(page.is_empty());
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_next());
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2], PageRequest::new(0, 5), 2);
        let mapped = page.map(|x| x.to_string());
        assert_eq!(mapped.content, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(mapped.total_elements, 2);
    }
}
