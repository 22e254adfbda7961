//! Page slicing and pagination metadata
//!
//! # Example
//!
//! ```rust
//! use deepdev_api::query::paginate;
//!
//! let items: Vec<u32> = (1..=25).collect();
//! let page = paginate(&items, 3, 10);
//! assert_eq!(page.data, vec![21, 22, 23, 24, 25]);
//! assert_eq!(page.pagination.total_pages, 3);
//! assert!(!page.pagination.has_next);
//! assert!(page.pagination.has_prev);
//! ```

use serde::{Deserialize, Serialize};

/// Pagination metadata attached to list responses
///
/// `page` is always the clamped page actually served.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub limit: u32,
    /// Matching items before slicing
    pub total: u64,
    /// Total number of pages, zero for an empty result
    pub total_pages: u32,
    /// Whether there is a next page
    pub has_next: bool,
    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Build metadata for an already clamped page
    ///
    /// # Example
    ///
    /// ```rust
    /// use deepdev_api::query::PaginationMeta;
    ///
    /// let meta = PaginationMeta::new(2, 20, 50);
    /// assert_eq!(meta.total_pages, 3);
    /// assert!(meta.has_next);
    /// assert!(meta.has_prev);
    /// ```
    #[must_use]
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = calculate_total_pages(total, limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Offset of the first item on this page
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Calculate total pages, rounding up
fn calculate_total_pages(total: u64, limit: u32) -> u32 {
    let limit = u64::from(limit);
    let pages = total.div_ceil(limit);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Clamp a requested page into `[1, max(1, total_pages)]`
fn clamp_page(requested: i64, total_pages: u32) -> u32 {
    let upper = i64::from(total_pages.max(1));
    // In range after the clamp, so the conversion cannot fail.
    u32::try_from(requested.clamp(1, upper)).unwrap_or(1)
}

/// One page of a collection together with its metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    /// Items on this page
    pub data: Vec<T>,
    /// Pagination metadata
    pub pagination: PaginationMeta,
}

impl<T> Page<T> {
    /// Map each item on the page, keeping the metadata
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }

    /// Number of items on this page
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether this page holds no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Slice `items` into the requested page
///
/// Out-of-range requests are served the nearest valid page rather than an
/// empty result. A zero `limit` is treated as one.
pub fn paginate<T: Clone>(items: &[T], page: i64, limit: u32) -> Page<T> {
    let limit = limit.max(1);
    let total = items.len() as u64;
    let total_pages = calculate_total_pages(total, limit);
    let current = clamp_page(page, total_pages);

    let pagination = PaginationMeta::new(current, limit, total);
    let start = usize::try_from(pagination.offset())
        .unwrap_or(usize::MAX)
        .min(items.len());
    let end = start.saturating_add(limit as usize).min(items.len());

    Page {
        data: items[start..end].to_vec(),
        pagination,
    }
}
