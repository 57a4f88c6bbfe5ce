//! Error types for the GOV.UK API adapters.

use bytes::Bytes;
use derive_more::{Display, Error, From};
use serde_json::Value;

// ============================================================================
// HTTP Error Kind
// ============================================================================

/// Classification of a non-2xx HTTP status.
///
/// Statuses that callers commonly branch on get their own kind; everything
/// else falls into the [`Client`](Self::Client) or [`Server`](Self::Server)
/// bucket for its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum HttpErrorKind {
    /// 401 Unauthorized.
    #[display("unauthorized")]
    Unauthorized,
    /// 403 Forbidden.
    #[display("forbidden")]
    Forbidden,
    /// 404 Not Found.
    #[display("not found")]
    NotFound,
    /// 409 Conflict.
    #[display("conflict")]
    Conflict,
    /// 410 Gone.
    #[display("gone")]
    Gone,
    /// 413 Payload Too Large.
    #[display("payload too large")]
    PayloadTooLarge,
    /// 422 Unprocessable Entity.
    #[display("unprocessable entity")]
    UnprocessableEntity,
    /// 429 Too Many Requests.
    #[display("too many requests")]
    TooManyRequests,
    /// Any other 4xx status.
    #[display("client error")]
    Client,
    /// 500 Internal Server Error.
    #[display("internal server error")]
    InternalServerError,
    /// 502 Bad Gateway.
    #[display("bad gateway")]
    BadGateway,
    /// 503 Service Unavailable.
    #[display("service unavailable")]
    ServiceUnavailable,
    /// 504 Gateway Timeout.
    #[display("gateway timeout")]
    GatewayTimeout,
    /// Any other 5xx status.
    #[display("server error")]
    Server,
    /// Informational or redirection status that was not followed.
    #[display("unexpected status")]
    Other,
}

impl HttpErrorKind {
    /// Classify an HTTP status code.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            410 => Self::Gone,
            413 => Self::PayloadTooLarge,
            422 => Self::UnprocessableEntity,
            429 => Self::TooManyRequests,
            400..=499 => Self::Client,
            500 => Self::InternalServerError,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            500..=599 => Self::Server,
            _ => Self::Other,
        }
    }

    /// Returns `true` for every 4xx kind.
    #[must_use]
    pub const fn is_client_error(self) -> bool {
        matches!(
            self,
            Self::Unauthorized
                | Self::Forbidden
                | Self::NotFound
                | Self::Conflict
                | Self::Gone
                | Self::PayloadTooLarge
                | Self::UnprocessableEntity
                | Self::TooManyRequests
                | Self::Client
        )
    }

    /// Returns `true` for every 5xx kind.
    #[must_use]
    pub const fn is_server_error(self) -> bool {
        matches!(
            self,
            Self::InternalServerError
                | Self::BadGateway
                | Self::ServiceUnavailable
                | Self::GatewayTimeout
                | Self::Server
        )
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for adapter operations.
///
/// HTTP-status failures ([`Error::Http`]) are kept apart from failures where
/// the request never completed ([`Error::Connection`], [`Error::Tls`],
/// [`Error::Timeout`]) and from local validation ([`Error::InvalidArgument`]).
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The server answered with a non-2xx status.
    #[display("HTTP {status} ({kind}): {message}")]
    #[from(skip)]
    Http {
        /// Classification of the status.
        kind: HttpErrorKind,
        /// HTTP status code.
        status: u16,
        /// Error message, taken from the JSON error body when present.
        message: String,
        /// Raw response body, if any.
        #[error(not(source))]
        body: Option<Bytes>,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Caller-supplied parameters were rejected before any request was sent.
    #[display("invalid argument: {_0}")]
    #[from(skip)]
    InvalidArgument(#[error(not(source))] String),

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "error.fields.base_path").
        path: String,
        /// Error message.
        message: String,
    },

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP error from status code and message.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            kind: HttpErrorKind::from_status(status),
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Create an HTTP error with body.
    #[must_use]
    pub fn http_with_body(status: u16, message: impl Into<String>, body: Bytes) -> Self {
        Self::Http {
            kind: HttpErrorKind::from_status(status),
            status,
            message: message.into(),
            body: Some(body),
        }
    }

    /// Build the error for a non-2xx response.
    ///
    /// The message is `error.message` from a JSON body when there is one,
    /// otherwise the canonical reason phrase of the status.
    #[must_use]
    pub fn from_response(status: u16, body: Bytes) -> Self {
        let message = serde_json::from_slice::<Value>(&body)
            .ok()
            .as_ref()
            .and_then(message_from_details)
            .unwrap_or_else(|| reason_phrase(status));

        if body.is_empty() {
            Self::http(status, message)
        } else {
            Self::http_with_body(status, message, body)
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if the request never completed (connection, TLS or timeout).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Tls(_) | Self::Timeout)
    }

    /// Returns `true` if this is a local argument error.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the status classification if this is an HTTP error.
    #[must_use]
    pub const fn kind(&self) -> Option<HttpErrorKind> {
        match self {
            Self::Http { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.kind().is_some_and(HttpErrorKind::is_client_error)
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.kind().is_some_and(HttpErrorKind::is_server_error)
    }

    /// Returns `true` if this is a 404 Not Found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(HttpErrorKind::NotFound)
    }

    /// Returns `true` if this is a 409 Conflict error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.kind() == Some(HttpErrorKind::Conflict)
    }

    /// Returns the response body if this is an HTTP error with a body.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// The parsed JSON error body, when the server sent one.
    #[must_use]
    pub fn error_details(&self) -> Option<Value> {
        self.body()
            .and_then(|body| serde_json::from_slice(body).ok())
    }

    /// The `error.message` field of the JSON error body.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error_details().as_ref().and_then(message_from_details)
    }

    /// Try to decode the HTTP error body as JSON.
    ///
    /// Returns `Some(Ok(value))` if the error has a body and it deserializes successfully,
    /// `Some(Err(error))` if the body exists but deserialization fails,
    /// or `None` if there is no body or this is not an HTTP error.
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| crate::from_json(body))
    }
}

fn message_from_details(details: &Value) -> Option<String> {
    details
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn reason_phrase(status: u16) -> String {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown status")
        .to_owned()
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    #[test]
    fn error_display() {
        let err = Error::http(404, "Not Found");
        assert_eq!(err.to_string(), "HTTP 404 (not found): Not Found");

        let err = Error::Timeout;
        assert_eq!(err.to_string(), "request timeout");

        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "connection error: failed to connect");

        let err = Error::invalid_argument("tags and links are exclusive");
        assert_eq!(
            err.to_string(),
            "invalid argument: tags and links are exclusive"
        );
    }

    #[test]
    fn kind_from_status() {
        check!(HttpErrorKind::from_status(404) == HttpErrorKind::NotFound);
        check!(HttpErrorKind::from_status(409) == HttpErrorKind::Conflict);
        check!(HttpErrorKind::from_status(422) == HttpErrorKind::UnprocessableEntity);
        check!(HttpErrorKind::from_status(418) == HttpErrorKind::Client);
        check!(HttpErrorKind::from_status(502) == HttpErrorKind::BadGateway);
        check!(HttpErrorKind::from_status(599) == HttpErrorKind::Server);
        check!(HttpErrorKind::from_status(302) == HttpErrorKind::Other);
    }

    #[test]
    fn error_status() {
        let err = Error::http(422, "Unprocessable entity");
        assert_eq!(err.status(), Some(422));
        assert!(err.is_client_error());
        assert!(!err.is_server_error());

        let err = Error::http(503, "Service Unavailable");
        assert_eq!(err.kind(), Some(HttpErrorKind::ServiceUnavailable));
        assert!(!err.is_client_error());
        assert!(err.is_server_error());

        let err = Error::Timeout;
        assert_eq!(err.status(), None);
        assert!(!err.is_client_error());
        assert!(err.is_transport());
    }

    #[test]
    fn error_is_not_found() {
        assert!(Error::http(404, "Not Found").is_not_found());
        assert!(!Error::http(400, "Bad Request").is_not_found());
        assert!(!Error::Timeout.is_not_found());
    }

    #[test]
    fn from_response_extracts_message() {
        let body = Bytes::from(
            r#"{"error":{"code":409,"message":"Conflict","fields":{"base_path":["is already in use by the 'publisher' app"]}}}"#,
        );
        let err = Error::from_response(409, body);

        assert!(err.is_conflict());
        assert_eq!(err.error_message().as_deref(), Some("Conflict"));
        let_assert!(Some(details) = err.error_details());
        check!(details["error"]["code"] == 409);
    }

    #[test]
    fn from_response_falls_back_to_reason_phrase() {
        let err = Error::from_response(500, Bytes::from("<html>oops</html>"));
        let_assert!(Error::Http { message, body, .. } = &err);
        check!(message == "Internal Server Error");
        check!(body.is_some());
        check!(err.error_details().is_none());

        let err = Error::from_response(404, Bytes::new());
        check!(err.body().is_none());
    }

    #[test]
    fn error_decode_body() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct ApiError {
            error: String,
        }

        let body = Bytes::from(r#"{"error": "not found"}"#);
        let err = Error::http_with_body(404, "Not Found", body);

        let_assert!(Some(Ok(decoded)) = err.decode_body::<ApiError>());
        assert_eq!(
            decoded,
            ApiError {
                error: "not found".to_string()
            }
        );

        let err = Error::http(404, "Not Found");
        assert!(err.decode_body::<ApiError>().is_none());

        assert!(Error::Timeout.decode_body::<ApiError>().is_none());
    }
}
