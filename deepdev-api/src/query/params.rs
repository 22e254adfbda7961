//! Query parameter normalization for list operations
//!
//! Raw query strings are turned into a typed [`ListQuery`]. The four reserved
//! keys (`page`, `limit`, `sort`, `search`) are consumed here; every other key
//! becomes a filter on the same-named record field.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use deepdev_api::query::ListQuery;
//!
//! let mut raw = HashMap::new();
//! raw.insert("page".to_string(), "2".to_string());
//! raw.insert("sort".to_string(), "-id".to_string());
//! raw.insert("category".to_string(), "inspiration".to_string());
//!
//! let query = ListQuery::from_params(&raw);
//! assert_eq!(query.page, 2);
//! assert_eq!(query.limit, 10);
//! assert!(query.sort.as_ref().unwrap().descending);
//! assert_eq!(query.filters.get("category").map(String::as_str), Some("inspiration"));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default page number
pub const DEFAULT_PAGE: i64 = 1;

/// Default number of items per page
pub const DEFAULT_LIMIT: u32 = 10;

/// Query keys consumed by the normalizer and never treated as filters
pub const RESERVED_KEYS: &[&str] = &["page", "limit", "sort", "search"];

/// Marker prefix selecting descending order
const DESCENDING_MARKER: char = '-';

/// A parsed sort request
///
/// # Example
///
/// ```rust
/// use deepdev_api::query::SortKey;
///
/// let key = SortKey::parse("-stars").unwrap();
/// assert_eq!(key.field, "stars");
/// assert!(key.descending);
/// assert_eq!(key.to_string(), "-stars");
///
/// assert!(SortKey::parse("").is_none());
/// assert!(SortKey::parse("-").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Record field to order by
    pub field: String,
    /// Reverse the natural order
    pub descending: bool,
}

impl SortKey {
    /// Parse `field` or `-field`; `None` when no field name remains
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (field, descending) = match raw.strip_prefix(DESCENDING_MARKER) {
            Some(rest) => (rest, true),
            None => (raw, false),
        };

        if field.is_empty() {
            return None;
        }

        Some(Self {
            field: field.to_string(),
            descending,
        })
    }

    /// Ascending order on `field`
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    /// Descending order on `field`
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "{}{}", DESCENDING_MARKER, self.field)
        } else {
            write!(f, "{}", self.field)
        }
    }
}

/// Normalized list request
///
/// `page` is kept signed: out-of-range values (including zero and negatives)
/// are legal here and get clamped by the paginator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Requested page number (1-indexed before clamping)
    pub page: i64,
    /// Items per page, always positive
    pub limit: u32,
    /// Optional sort key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortKey>,
    /// Optional free-text search term
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Residual query parameters, keyed by field name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: None,
            search: None,
            filters: BTreeMap::new(),
        }
    }
}

impl ListQuery {
    /// Create a query with default paging and no criteria
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a query from raw query-string parameters
    ///
    /// Malformed `page`/`limit` values fall back to their defaults instead of
    /// failing the request.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use deepdev_api::query::ListQuery;
    ///
    /// let raw: HashMap<String, String> = [
    ///     ("page".to_string(), "abc".to_string()),
    ///     ("limit".to_string(), "0".to_string()),
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// let query = ListQuery::from_params(&raw);
    /// assert_eq!(query.page, 1);
    /// assert_eq!(query.limit, 10);
    /// assert!(query.filters.is_empty());
    /// ```
    #[must_use]
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let page = params
            .get("page")
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_PAGE);

        let limit = params
            .get("limit")
            .and_then(|l| l.trim().parse::<u32>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIMIT);

        let sort = params.get("sort").and_then(|s| SortKey::parse(s));
        let search = params.get("search").cloned();

        let filters = params
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            page,
            limit,
            sort,
            search,
            filters,
        }
    }

    /// Set the page number
    #[must_use]
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    /// Set the page size; zero is ignored
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        if limit > 0 {
            self.limit = limit;
        }
        self
    }

    /// Set the sort key
    #[must_use]
    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set the sort key only when the request did not carry one
    #[must_use]
    pub fn with_default_sort(mut self, sort: SortKey) -> Self {
        self.sort.get_or_insert(sort);
        self
    }

    /// Set the search term
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Add a filter on `field`
    #[must_use]
    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Drop a filter, returning its value
    pub fn take_filter(&mut self, field: &str) -> Option<String> {
        self.filters.remove(field)
    }

    /// Whether a non-empty search term is present
    #[must_use]
    pub fn has_search(&self) -> bool {
        self.search.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// Whether any filter with a non-empty value is present
    #[must_use]
    pub fn has_filters(&self) -> bool {
        self.filters.values().any(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_missing() {
        let query = ListQuery::from_params(&HashMap::new());
        assert_eq!(query, ListQuery::default());
        assert_eq!(query.page, DEFAULT_PAGE);
        assert_eq!(query.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let query = ListQuery::from_params(&params(&[("page", "two"), ("limit", "-5")]));
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
    }

    #[test]
    fn test_non_positive_page_is_preserved_for_clamping() {
        let query = ListQuery::from_params(&params(&[("page", "0")]));
        assert_eq!(query.page, 0);

        let query = ListQuery::from_params(&params(&[("page", "-3")]));
        assert_eq!(query.page, -3);
    }

    #[test]
    fn test_no_upper_bound_on_limit() {
        let query = ListQuery::from_params(&params(&[("limit", "5000")]));
        assert_eq!(query.limit, 5000);
    }

    #[test]
    fn test_reserved_keys_are_not_filters() {
        let query = ListQuery::from_params(&params(&[
            ("page", "1"),
            ("limit", "5"),
            ("sort", "author"),
            ("search", "love"),
            ("author", "Steve Jobs"),
        ]));
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters["author"], "Steve Jobs");
        assert_eq!(query.search.as_deref(), Some("love"));
        assert_eq!(query.sort, Some(SortKey::asc("author")));
    }

    #[test]
    fn test_empty_filter_value_is_kept_but_inactive() {
        let query = ListQuery::from_params(&params(&[("category", "")]));
        assert_eq!(query.filters["category"], "");
        assert!(!query.has_filters());
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(SortKey::parse("id"), Some(SortKey::asc("id")));
        assert_eq!(SortKey::parse("-id"), Some(SortKey::desc("id")));
        assert_eq!(SortKey::parse("  -name "), Some(SortKey::desc("name")));
        assert_eq!(SortKey::parse(""), None);
        assert_eq!(SortKey::parse("-"), None);
    }

    #[test]
    fn test_empty_sort_param_means_no_sort() {
        let query = ListQuery::from_params(&params(&[("sort", "")]));
        assert!(query.sort.is_none());
    }

    #[test]
    fn test_with_default_sort_respects_request() {
        let query = ListQuery::new()
            .with_sort(SortKey::desc("population"))
            .with_default_sort(SortKey::asc("name"));
        assert_eq!(query.sort, Some(SortKey::desc("population")));

        let query = ListQuery::new().with_default_sort(SortKey::asc("name"));
        assert_eq!(query.sort, Some(SortKey::asc("name")));
    }

    #[test]
    fn test_with_limit_ignores_zero() {
        assert_eq!(ListQuery::new().with_limit(0).limit, DEFAULT_LIMIT);
        assert_eq!(ListQuery::new().with_limit(3).limit, 3);
    }

    #[test]
    fn test_has_search() {
        assert!(!ListQuery::new().has_search());
        assert!(!ListQuery::new().with_search("").has_search());
        assert!(ListQuery::new().with_search("bug").has_search());
    }

    #[test]
    fn test_take_filter() {
        let mut query = ListQuery::new().with_filter("language", "Spanish");
        assert_eq!(query.take_filter("language").as_deref(), Some("Spanish"));
        assert!(query.filters.is_empty());
    }
}
