//! Type-aware, stable ordering on a single field
//!
//! Ordering rules:
//! - two strings compare case-folded first, then by raw code points
//! - two numbers compare numerically
//! - booleans order `false` before `true`
//! - values of different types order by type: numbers, then strings, then
//!   booleans, then lists
//! - a null or missing value always sorts last, whatever the direction

use std::cmp::Ordering;

use crate::query::params::SortKey;
use crate::record::{FieldValue, Record};

fn is_null(value: Option<FieldValue<'_>>) -> bool {
    value.is_none_or(|v| v.is_null())
}

/// Compare two strings approximating a locale-aware collation
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Position of a value's type in cross-type comparisons
fn type_rank(value: FieldValue<'_>) -> u8 {
    match value {
        FieldValue::Number(_) => 0,
        FieldValue::Text(_) => 1,
        FieldValue::Bool(_) => 2,
        FieldValue::TextList(_) | FieldValue::JsonList(_) => 3,
        FieldValue::Null => 4,
    }
}

/// Direction-independent total order over two non-null values
fn compare_values(a: FieldValue<'_>, b: FieldValue<'_>) -> Ordering {
    match (a, b) {
        (FieldValue::Text(x), FieldValue::Text(y)) => compare_text(x, y),
        (FieldValue::Number(x), FieldValue::Number(y)) => x.total_cmp(&y),
        (FieldValue::Bool(x), FieldValue::Bool(y)) => x.cmp(&y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Order two records by `key`
///
/// Null placement is resolved before the direction is applied, so nulls
/// trail in both ascending and descending order.
pub fn compare_by<R: Record>(a: &R, b: &R, key: &SortKey) -> Ordering {
    let left = a.field(&key.field);
    let right = b.field(&key.field);

    match (is_null(left), is_null(right)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let (Some(x), Some(y)) = (left, right) else {
                return Ordering::Equal;
            };
            let ordering = compare_values(x, y);
            if key.descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
    }
}

/// Return a new, stably sorted collection
///
/// The input slice is left untouched. `None` returns the input order.
///
/// # Example
///
/// ```rust
/// use deepdev_api::query::{apply_sort, SortKey};
/// use serde_json::json;
///
/// let items = vec![json!({"id": 1}), json!({"id": 3}), json!({"id": 2})];
/// let sorted = apply_sort(&items, Some(&SortKey::desc("id")));
/// let ids: Vec<_> = sorted.iter().map(|v| v["id"].as_i64().unwrap()).collect();
/// assert_eq!(ids, vec![3, 2, 1]);
/// ```
pub fn apply_sort<R>(items: &[R], key: Option<&SortKey>) -> Vec<R>
where
    R: Record + Clone,
{
    let mut sorted = items.to_vec();
    if let Some(key) = key {
        sorted.sort_by(|a, b| compare_by(a, b, key));
    }
    sorted
}
