//! Field access capability shared by every resource type
//!
//! The query pipeline is written once against [`Record`]. Each resource
//! (quotes, countries, planets, ...) exposes its fields by name through a
//! borrowed [`FieldValue`], so filtering, searching and sorting never need
//! to know the concrete struct.
//!
//! # Example
//!
//! ```rust
//! use deepdev_api::record::{FieldValue, Record};
//!
//! struct Joke {
//!     id: u32,
//!     joke: String,
//! }
//!
//! impl Record for Joke {
//!     fn field(&self, name: &str) -> Option<FieldValue<'_>> {
//!         match name {
//!             "id" => Some(FieldValue::from(self.id)),
//!             "joke" => Some(FieldValue::from(&self.joke)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let joke = Joke { id: 7, joke: "light attracts bugs".to_string() };
//! assert_eq!(joke.field("id"), Some(FieldValue::Number(7.0)));
//! assert!(joke.field("author").is_none());
//! ```

use serde_json::Value;

/// A borrowed view of one field on a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// String field
    Text(&'a str),
    /// Any numeric field, widened to `f64`
    Number(f64),
    /// Boolean field
    Bool(bool),
    /// Array of strings (tags, languages, ...)
    TextList(&'a [String]),
    /// Array from a loosely shaped JSON record; only string elements match
    JsonList(&'a [Value]),
    /// Field exists but holds no value
    Null,
}

impl FieldValue<'_> {
    /// Whether this value is `Null`
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether any string element of a list value satisfies `pred`
    ///
    /// Scalars and non-string JSON elements never match.
    pub fn any_text(&self, mut pred: impl FnMut(&str) -> bool) -> bool {
        match self {
            Self::TextList(items) => items.iter().any(|item| pred(item)),
            Self::JsonList(items) => items.iter().filter_map(Value::as_str).any(pred),
            _ => false,
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(s: &'a str) -> Self {
        Self::Text(s)
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(s: &'a String) -> Self {
        Self::Text(s.as_str())
    }
}

impl<'a> From<&'a Vec<String>> for FieldValue<'a> {
    fn from(list: &'a Vec<String>) -> Self {
        Self::TextList(list.as_slice())
    }
}

impl From<bool> for FieldValue<'_> {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for FieldValue<'_> {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for FieldValue<'_> {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for FieldValue<'_> {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<u64> for FieldValue<'_> {
    fn from(n: u64) -> Self {
        Self::Number(n as f64)
    }
}

impl<'a> From<&'a Option<String>> for FieldValue<'a> {
    fn from(opt: &'a Option<String>) -> Self {
        opt.as_deref().map_or(Self::Null, Self::Text)
    }
}

impl<'a> From<&'a f64> for FieldValue<'a> {
    fn from(n: &'a f64) -> Self {
        Self::Number(*n)
    }
}

impl<'a> From<&'a u64> for FieldValue<'a> {
    fn from(n: &'a u64) -> Self {
        Self::Number(*n as f64)
    }
}

/// Named-field access over one item of a collection
///
/// Returning `None` means the record has no such field at all, while
/// `Some(FieldValue::Null)` means the field is declared but unset.
pub trait Record {
    /// Look up a field by its wire name
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        (**self).field(name)
    }
}

/// Loosely shaped JSON objects
///
/// Arrays surface as [`FieldValue::JsonList`]; nested objects are not
/// addressable and report `None`.
impl Record for Value {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match self.as_object()?.get(name)? {
            Value::String(s) => Some(FieldValue::Text(s)),
            Value::Number(n) => n.as_f64().map(FieldValue::Number),
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Null => Some(FieldValue::Null),
            Value::Array(items) => Some(FieldValue::JsonList(items)),
            Value::Object(_) => None,
        }
    }
}
