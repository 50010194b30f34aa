//! Pagination over in-memory result sets.

use serde::{Deserialize, Serialize};

/// A request for one page of results (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Requested page number, starting at 1.
    pub page: u32,
    /// Number of items per page.
    pub per_page: u32,
}

impl PageRequest {
    /// Default page size used by list views.
    pub const DEFAULT_PER_PAGE: u32 = 10;

    /// Create a page request.
    #[must_use]
    pub const fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Everything on one page.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            page: 1,
            per_page: u32::MAX,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_PER_PAGE)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items in the current page.
    pub items: Vec<T>,
    /// The current page number (1-based), after clamping.
    pub page: u32,
    /// The number of items per page.
    pub per_page: u32,
    /// Total number of items matching the query.
    pub total: usize,
    /// Total number of pages available (at least 1).
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Slice `items` according to `request`.
    ///
    /// A `per_page` of zero is treated as one. Pages past the end clamp to the
    /// last page and page zero clamps to the first, mirroring a pager whose
    /// previous/next buttons are disabled at the edges.
    #[must_use]
    pub fn paginate(items: Vec<T>, request: PageRequest) -> Self {
        let per_page = request.per_page.max(1);
        let total = items.len();
        let per_page_usize = usize::try_from(per_page).unwrap_or(usize::MAX);
        let total_pages =
            u32::try_from(total.div_ceil(per_page_usize).max(1)).unwrap_or(u32::MAX);
        let page = request.page.clamp(1, total_pages);

        let skip = usize::try_from(page - 1)
            .unwrap_or(usize::MAX)
            .saturating_mul(per_page_usize);
        let items = items.into_iter().skip(skip).take(per_page_usize).collect();

        Self {
            items,
            page,
            per_page,
            total,
            total_pages,
        }
    }

    /// Whether a following page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether a preceding page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: u32) -> Vec<u32> {
        (1..=n).collect()
    }

    #[test]
    fn test_first_page() {
        let page = Page::paginate(numbers(25), PageRequest::new(1, 10));
        assert_eq!(page.items, numbers(10));
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_last_partial_page() {
        let page = Page::paginate(numbers(25), PageRequest::new(3, 10));
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert!(!page.has_next());
    }

    #[test]
    fn test_out_of_range_clamps() {
        let page = Page::paginate(numbers(25), PageRequest::new(99, 10));
        assert_eq!(page.page, 3);
        let page = Page::paginate(numbers(25), PageRequest::new(0, 10));
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_empty_has_one_page() {
        let page = Page::paginate(Vec::<u32>::new(), PageRequest::default());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_zero_per_page() {
        let page = Page::paginate(numbers(3), PageRequest::new(2, 0));
        assert_eq!(page.per_page, 1);
        assert_eq!(page.items, vec![2]);
    }

    #[test]
    fn test_all() {
        let page = Page::paginate(numbers(40), PageRequest::all());
        assert_eq!(page.items.len(), 40);
        assert_eq!(page.total_pages, 1);
    }
}
