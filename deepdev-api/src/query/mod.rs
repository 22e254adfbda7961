//! Shared list-query pipeline
//!
//! Every resource answers list requests the same way:
//!
//! 1. [`ListQuery::from_params`] normalizes the raw query string
//! 2. [`apply_filters`] keeps records satisfying every residual filter
//! 3. [`apply_search`] keeps records where any search field contains the term
//! 4. [`apply_sort`] orders the survivors by the requested key
//! 5. [`paginate`] slices out one page and computes its metadata
//!
//! Filtering and searching both only remove records, so their order never
//! changes the result.
//!
//! Each stage is a pure function over a borrowed slice and returns a new
//! collection, so a shared dataset snapshot can be queried concurrently
//! without locking.
//!
//! # Example
//!
//! ```rust
//! use deepdev_api::query::{ListQuery, SortKey};
//! use serde_json::json;
//!
//! let quotes = vec![
//!     json!({"id": 1, "quote": "Love what you do", "author": "Steve Jobs", "category": "inspiration"}),
//!     json!({"id": 2, "quote": "Stay hungry", "author": "Steve Jobs", "category": "inspiration"}),
//!     json!({"id": 3, "quote": "Code wins", "author": "Linus", "category": "programming"}),
//! ];
//!
//! let query = ListQuery::new()
//!     .with_filter("category", "inspiration")
//!     .with_sort(SortKey::desc("id"))
//!     .with_limit(1);
//!
//! let page = query.run(&quotes, &["quote", "author"]);
//! assert_eq!(page.data[0]["id"], 2);
//! assert_eq!(page.pagination.total, 2);
//! assert!(page.pagination.has_next);
//! ```

mod filter;
mod paginate;
mod params;
mod search;
mod sort;

pub use filter::apply_filters;
pub use paginate::{paginate, Page, PaginationMeta};
pub use params::{ListQuery, SortKey, DEFAULT_LIMIT, DEFAULT_PAGE, RESERVED_KEYS};
pub use search::apply_search;
pub use sort::{apply_sort, compare_by};

use crate::record::Record;

impl ListQuery {
    /// Run search, filters and sort without paginating
    ///
    /// Useful for endpoints that cap results with a plain `limit` instead of
    /// pages, or that pick a random item from the matches.
    pub fn select<R>(&self, items: &[R], search_fields: &[&str]) -> Vec<R>
    where
        R: Record + Clone,
    {
        let filtered = apply_filters(items, &self.filters);
        let searched = match self.search.as_deref() {
            Some(term) => apply_search(&filtered, term, search_fields),
            None => filtered,
        };
        apply_sort(&searched, self.sort.as_ref())
    }

    /// Run the full pipeline and return the requested page
    pub fn run<R>(&self, items: &[R], search_fields: &[&str]) -> Page<R>
    where
        R: Record + Clone,
    {
        let selected = self.select(items, search_fields);
        paginate(&selected, self.page, self.limit)
    }
}
