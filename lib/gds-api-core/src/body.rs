//! Body serialization utilities.

use bytes::Bytes;

use crate::Result;

/// Content type for request and response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
        }
    }

    /// Returns `true` if a `Content-Type` header value denotes JSON.
    ///
    /// Parameters such as `charset` are ignored, and structured suffixes
    /// (`application/problem+json`) are accepted.
    #[must_use]
    pub fn is_json(header_value: &str) -> bool {
        let mime = header_value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        mime == "application/json" || mime.ends_with("+json")
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use gds_api_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Subscribe { address: String }
///
/// let body = Subscribe { address: "test@example.com".to_string() };
/// let bytes = to_json(&body).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"address":"test@example.com"}"#);
/// ```
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so the error names the field that failed
/// (e.g., "areas.123.codes").
///
/// # Errors
///
/// Returns an error if JSON deserialization fails.
///
/// # Example
///
/// ```
/// use gds_api_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct Section { title: String }
///
/// let section: Section = from_json(br#"{"title":"Business"}"#).expect("deserialize");
/// assert_eq!(section, Section { title: "Business".to_string() });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}
