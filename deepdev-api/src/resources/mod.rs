//! HTTP resources served under `/api`
//!
//! Each submodule owns its record types and its routes. List endpoints run
//! through the shared [`crate::query`] pipeline; curated endpoints express
//! their fixed sort options as [`SortKey`]s and cap results with `limit`.

use std::collections::HashMap;

use axum::Router;
use rand::seq::IndexedRandom;

use crate::query::SortKey;
use crate::state::AppState;

pub mod countries;
pub mod currency;
pub mod developer;
pub mod facts;
pub mod finance;
pub mod fun;
pub mod ip;
pub mod jokes;
pub mod quotes;
pub mod space;
pub mod time;
pub mod utilities;

/// Raw query-string parameters
pub type Params = HashMap<String, String>;

/// Default cap for curated lists
pub(crate) const DEFAULT_LIST_LIMIT: usize = 10;

/// All resource routes, to be nested under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(countries::routes())
        .merge(currency::routes())
        .merge(developer::routes())
        .merge(facts::routes())
        .merge(finance::routes())
        .merge(fun::routes())
        .merge(ip::routes())
        .merge(jokes::routes())
        .merge(quotes::routes())
        .merge(space::routes())
        .merge(time::routes())
        .merge(utilities::routes())
}

/// A parameter value, ignoring empty strings
pub(crate) fn non_empty<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Case-insensitive equality
pub(crate) fn equals_folded(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Pick one element uniformly at random
pub(crate) fn pick_random<T>(items: &[T]) -> Option<&T> {
    items.choose(&mut rand::rng())
}

/// Result cap for curated lists
///
/// A missing value uses `default`; zero, negative or malformed values
/// disable the cap.
pub(crate) fn list_limit(params: &Params, default: usize) -> Option<usize> {
    match params.get("limit") {
        None => Some(default),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok()),
    }
}

/// Resolve a named sort option against a fixed table
///
/// Unknown or missing names fall back to `default`.
pub(crate) fn curated_sort(
    requested: Option<&str>,
    options: &[(&str, &str)],
    default: &str,
) -> SortKey {
    let raw = requested
        .and_then(|name| options.iter().find(|(option, _)| *option == name))
        .map_or(default, |(_, key)| *key);
    SortKey::parse(raw).unwrap_or_else(|| SortKey::asc(raw))
}

/// Truncate to an optional cap
pub(crate) fn cap<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}
