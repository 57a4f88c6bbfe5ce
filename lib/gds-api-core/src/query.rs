//! Nested query-string encoding.
//!
//! GOV.UK services decode query strings with the bracket convention used by
//! Rack and Rails: lists are sent as `key[]=a&key[]=b` and mappings as
//! `key[sub]=v`, nested to any depth. [`Query`] builds such strings from an
//! ordered list of parameters, dropping absent values instead of sending
//! them empty.
//!
//! # Example
//!
//! ```
//! use gds_api_core::Query;
//!
//! let query = Query::new()
//!     .param("attributes", ["email", "name"].as_slice())
//!     .opt("state_id", None::<&str>);
//!
//! assert_eq!(
//!     query.to_query_string(),
//!     "attributes%5B%5D=email&attributes%5B%5D=name"
//! );
//! ```

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::{Error, Result};

// ============================================================================
// Query Values
// ============================================================================

/// A single query parameter value: a scalar, a list, or a nested mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Plain value, sent as `key=value`.
    Scalar(String),
    /// Sequence, sent as `key[]=a&key[]=b`.
    List(Vec<QueryValue>),
    /// Ordered mapping, sent as `key[sub]=v`.
    Map(Vec<(String, QueryValue)>),
}

impl QueryValue {
    /// Build a mapping value from ordered entries.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Self>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Convert a JSON value, treating `null` as absent.
    ///
    /// Nulls nested in arrays and objects are dropped as well.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Scalar(b.to_string())),
            Value::Number(n) => Some(Self::Scalar(n.to_string())),
            Value::String(s) => Some(Self::Scalar(s.clone())),
            Value::Array(items) => Some(Self::List(
                items.iter().filter_map(Self::from_json).collect(),
            )),
            Value::Object(entries) => Some(Self::Map(
                entries
                    .iter()
                    .filter_map(|(k, v)| Self::from_json(v).map(|v| (k.clone(), v)))
                    .collect(),
            )),
        }
    }

    fn encode_into(&self, prefix: &str, out: &mut Vec<String>) {
        match self {
            Self::Scalar(value) => out.push(format!("{}={}", escape(prefix), escape(value))),
            Self::List(items) => {
                let prefix = format!("{prefix}[]");
                for item in items {
                    item.encode_into(&prefix, out);
                }
            }
            Self::Map(entries) => {
                for (key, value) in entries {
                    value.encode_into(&format!("{prefix}[{key}]"), out);
                }
            }
        }
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_owned())
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        Self::Scalar(value.clone())
    }
}

macro_rules! scalar_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_from_display!(bool, u8, u16, u32, u64, usize, i32, i64);

impl<T: Into<Self>> From<Vec<T>> for QueryValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Self>> From<&[T]> for QueryValue {
    fn from(items: &[T]) -> Self {
        Self::List(items.iter().cloned().map(Into::into).collect())
    }
}

// ============================================================================
// Query Builder
// ============================================================================

/// Ordered set of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, QueryValue)>,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a query from `(key, optional value)` pairs, keeping only the
    /// present values.
    pub fn compact<K, V>(pairs: impl IntoIterator<Item = (K, Option<V>)>) -> Self
    where
        K: Into<String>,
        V: Into<QueryValue>,
    {
        pairs.into_iter().collect()
    }

    /// Builds a query from a JSON object.
    ///
    /// `null` members are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `value` is not an object.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(entries) = value else {
            return Err(Error::invalid_argument(
                "query parameters must be a JSON object",
            ));
        };
        Ok(Self {
            params: entries
                .iter()
                .filter_map(|(k, v)| QueryValue::from_json(v).map(|v| (k.clone(), v)))
                .collect(),
        })
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Appends a parameter if the value is present.
    #[must_use]
    pub fn opt<V: Into<QueryValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Returns `true` if no parameter will be encoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_query_string().is_empty()
    }

    /// Encodes the parameters with nested bracket notation.
    ///
    /// Keys and values are form-encoded, so brackets in keys travel as
    /// `%5B`/`%5D` and spaces as `+`. Empty lists and mappings produce no
    /// output at all.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut out = Vec::new();
        for (key, value) in &self.params {
            value.encode_into(key, &mut out);
        }
        out.join("&")
    }

    /// Appends `?<query>` to a URL string, or returns it unchanged when there
    /// is nothing to encode.
    #[must_use]
    pub fn apply(&self, url: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            url.to_owned()
        } else {
            format!("{url}?{query}")
        }
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for Query
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |query, (key, value)| query.opt(key, value))
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

fn escape(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodes a nested query string back into a JSON object.
///
/// This is the inverse of [`Query::to_query_string`] for string scalars:
/// `a[]=x` becomes an array, `a[b]=x` an object, and a repeated plain key
/// keeps its last value.
#[must_use]
pub fn parse_nested(query: &str) -> Value {
    let mut root = Map::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let segments = key_segments(&key);
        insert(&mut root, &segments, Value::String(value.into_owned()));
    }
    Value::Object(root)
}

fn key_segments(key: &str) -> Vec<&str> {
    let Some((base, mut rest)) = key.split_once('[') else {
        return vec![key];
    };
    let mut segments = vec![base];
    while let Some((segment, tail)) = rest.split_once(']') {
        segments.push(segment);
        match tail.strip_prefix('[') {
            Some(next) => rest = next,
            None => break,
        }
    }
    segments
}

fn insert(target: &mut Map<String, Value>, segments: &[&str], value: Value) {
    let Some((head, tail)) = segments.split_first() else {
        return;
    };

    match tail.split_first() {
        None => {
            target.insert((*head).to_owned(), value);
        }
        Some((&"", rest)) => {
            let entry = target
                .entry((*head).to_owned())
                .or_insert_with(|| Value::Array(Vec::new()));
            if !entry.is_array() {
                *entry = Value::Array(Vec::new());
            }
            let Value::Array(items) = entry else {
                return;
            };
            if rest.is_empty() {
                items.push(value);
                return;
            }
            // `a[][b]=1&a[][c]=2` fills one object until a key repeats.
            let reuse_last = items
                .last()
                .and_then(Value::as_object)
                .zip(rest.first())
                .is_some_and(|(last, key)| !last.contains_key(*key));
            if !reuse_last {
                items.push(Value::Object(Map::new()));
            }
            if let Some(Value::Object(last)) = items.last_mut() {
                insert(last, rest, value);
            }
        }
        Some(_) => {
            let entry = target
                .entry((*head).to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert(child, tail, value);
            }
        }
    }
}
