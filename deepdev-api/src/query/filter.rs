//! Conjunctive field filters
//!
//! Each active filter constrains one field; a record must satisfy all of them.
//! Strings and string arrays match by case-insensitive containment, every
//! other field type by strict, type-aware equality.

use std::collections::BTreeMap;

use crate::record::{FieldValue, Record};

/// Case-insensitive substring test
pub(crate) fn contains_folded(haystack: &str, needle_folded: &str) -> bool {
    haystack.to_lowercase().contains(needle_folded)
}

/// Whether a single field value satisfies a filter value
///
/// `expected_folded` is the lowercase form of `expected`, computed once per
/// filter by the caller.
fn field_matches(value: Option<FieldValue<'_>>, expected: &str, expected_folded: &str) -> bool {
    match value {
        Some(FieldValue::Text(s)) => contains_folded(s, expected_folded),
        Some(list @ (FieldValue::TextList(_) | FieldValue::JsonList(_))) => {
            list.any_text(|item| contains_folded(item, expected_folded))
        }
        Some(FieldValue::Number(n)) => expected
            .trim()
            .parse::<f64>()
            .is_ok_and(|wanted| wanted == n),
        Some(FieldValue::Bool(b)) => match expected {
            "true" => b,
            "false" => !b,
            _ => false,
        },
        Some(FieldValue::Null) | None => false,
    }
}

/// Keep only records satisfying every non-empty filter
///
/// Empty filter values mean "no filter". The input is never reordered and
/// the result preserves relative order.
///
/// # Example
///
/// ```rust
/// use std::collections::BTreeMap;
/// use deepdev_api::query::apply_filters;
/// use serde_json::json;
///
/// let quotes = vec![
///     json!({"id": 1, "author": "Steve Jobs"}),
///     json!({"id": 2, "author": "Linus"}),
/// ];
/// let filters = BTreeMap::from([("author".to_string(), "steve".to_string())]);
///
/// let kept = apply_filters(&quotes, &filters);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0]["id"], 1);
/// ```
pub fn apply_filters<R>(items: &[R], filters: &BTreeMap<String, String>) -> Vec<R>
where
    R: Record + Clone,
{
    let active: Vec<(&str, &str, String)> = filters
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(field, value)| (field.as_str(), value.as_str(), value.to_lowercase()))
        .collect();

    items
        .iter()
        .filter(|item| {
            active
                .iter()
                .all(|(field, expected, folded)| field_matches(item.field(field), expected, folded))
        })
        .cloned()
        .collect()
}
