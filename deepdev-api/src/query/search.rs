//! Free-text search across a list of fields

use crate::query::filter::contains_folded;
use crate::record::{FieldValue, Record};

/// Keep records where any of `fields` contains `term`, ignoring case
///
/// Strings match by substring, string arrays when any element does. Other
/// field types never match. An empty term or an empty field list returns the
/// input unchanged.
///
/// # Example
///
/// ```rust
/// use deepdev_api::query::apply_search;
/// use serde_json::json;
///
/// let jokes = vec![
///     json!({"joke": "Why do programmers prefer dark mode? Because light attracts bugs!"}),
///     json!({"joke": "There are 10 kinds of people."}),
/// ];
///
/// assert_eq!(apply_search(&jokes, "BUGS", &["joke"]).len(), 1);
/// assert_eq!(apply_search(&jokes, "", &["joke"]).len(), 2);
/// ```
pub fn apply_search<R>(items: &[R], term: &str, fields: &[&str]) -> Vec<R>
where
    R: Record + Clone,
{
    if term.is_empty() || fields.is_empty() {
        return items.to_vec();
    }

    let folded = term.to_lowercase();

    items
        .iter()
        .filter(|item| {
            fields.iter().any(|field| match item.field(field) {
                Some(FieldValue::Text(s)) => contains_folded(s, &folded),
                Some(list @ (FieldValue::TextList(_) | FieldValue::JsonList(_))) => {
                    list.any_text(|v| contains_folded(v, &folded))
                }
                _ => false,
            })
        })
        .cloned()
        .collect()
}
