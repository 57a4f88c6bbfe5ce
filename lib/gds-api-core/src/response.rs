//! HTTP response handling.
//!
//! [`Response`] is what the transport hands back: status, headers and raw
//! body. [`JsonResponse`] is what adapters return to callers: the same
//! status and headers plus the parsed JSON document when the server sent
//! one.
//!
//! # Example
//!
//! ```ignore
//! let item = publishing_api.get_content(content_id).await?;
//! if let Some(item) = item {
//!     println!("{} ({})", item["title"], item.status());
//! }
//! ```

use std::collections::HashMap;
use std::ops::Index;

use bytes::Bytes;
use serde_json::Value;

use crate::{ContentType, Error, Result};

static NULL: Value = Value::Null;

// ============================================================================
// Raw Response
// ============================================================================

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HashMap<String, String>,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: B) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (u16, HashMap<String, String>, B) {
        (self.status, self.headers, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Status is 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

impl Response<Bytes> {
    /// Returns `true` if the `Content-Type` header denotes JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.header("content-type").is_some_and(ContentType::is_json)
    }

    /// Turn a non-2xx response into the matching [`Error::Http`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] unless the status is 2xx.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::from_response(self.status, self.body))
        }
    }

    /// Deserialize the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn json<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        crate::from_json(&self.body)
    }

    /// Get the response body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(self) -> std::result::Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }
}

// ============================================================================
// JSON Response
// ============================================================================

/// Successful response, with the body parsed when it is JSON.
///
/// Indexing by key or position never panics: missing entries (and
/// responses without a JSON body) index to `null`.
#[derive(Debug, Clone)]
pub struct JsonResponse {
    status: u16,
    headers: HashMap<String, String>,
    raw: Bytes,
    value: Option<Value>,
}

impl JsonResponse {
    /// Wrap a transport response.
    ///
    /// The body is parsed only when the content type is JSON and the body
    /// is not empty; otherwise the wrapper carries just the status, headers
    /// and raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonDeserialization`] if a JSON body is malformed.
    pub fn from_response(response: Response<Bytes>) -> Result<Self> {
        let parse = response.is_json() && !response.body().iter().all(u8::is_ascii_whitespace);
        let (status, headers, raw) = response.into_parts();
        let value = if parse {
            Some(crate::from_json::<Value>(&raw)?)
        } else {
            None
        };
        Ok(Self {
            status,
            headers,
            raw,
            value,
        })
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    /// The raw response body.
    #[must_use]
    pub fn raw_body(&self) -> &Bytes {
        &self.raw
    }

    /// The parsed document, if the response carried JSON.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Consume into the parsed document.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    /// Member of a top-level object.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.as_ref().and_then(|value| value.get(key))
    }

    /// Deserialize the body into a typed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the body does not match `T`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        crate::from_json(&self.raw)
    }
}

impl Index<&str> for JsonResponse {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}

impl Index<usize> for JsonResponse {
    type Output = Value;

    fn index(&self, position: usize) -> &Value {
        self.value
            .as_ref()
            .and_then(|value| value.get(position))
            .unwrap_or(&NULL)
    }
}

fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
