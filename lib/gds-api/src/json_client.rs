//! The shared JSON client every adapter is built on.
//!
//! [`JsonClient`] turns a verb, a full URL, an optional JSON body and extra
//! headers into a request, sends it through an [`HttpClient`], and maps the
//! answer:
//!
//! - 2xx → [`JsonResponse`] (parsed when the body is JSON)
//! - 404 on a lenient call → `Ok(None)`
//! - any other non-2xx → [`Error::Http`](crate::Error::Http) with the matching [`HttpErrorKind`](crate::HttpErrorKind)
//!
//! [`JsonClient::send`] skips the mapping entirely for callers that want
//! to inspect the status themselves.

use std::time::Duration;

use bytes::Bytes;
use gds_api_core::{ContentType, HttpClient, JsonResponse, to_json};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::{HyperClient, HyperClientBuilder, Method, Request, Response, Result};

/// `User-Agent` sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("gds-api-adapters/", env!("CARGO_PKG_VERSION"));

/// Extra headers for a single call, as `(name, value)` pairs.
pub type Headers<'a> = &'a [(&'a str, &'a str)];

/// Typed JSON client over an [`HttpClient`].
///
/// Default headers are `Accept: application/json` and a `User-Agent`.
/// Per-call headers override defaults with the same name, compared
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct JsonClient<C = HyperClient> {
    http: C,
    default_headers: Vec<(String, String)>,
}

impl JsonClient {
    /// Client over a default [`HyperClient`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_http_client(HyperClient::new())
    }

    /// Create a builder for a hyper-backed client.
    #[must_use]
    pub fn builder() -> JsonClientBuilder {
        JsonClientBuilder::default()
    }
}

impl Default for JsonClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: HttpClient> JsonClient<C> {
    /// Client over any transport.
    pub fn with_http_client(http: C) -> Self {
        Self {
            http,
            default_headers: vec![
                ("Accept".to_owned(), ContentType::Json.as_str().to_owned()),
                ("User-Agent".to_owned(), DEFAULT_USER_AGENT.to_owned()),
            ],
        }
    }

    /// Add or replace a header sent with every request.
    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.default_headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.default_headers.push((name, value.into()));
        self
    }

    /// Headers sent with every request.
    #[must_use]
    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    /// The underlying transport.
    #[must_use]
    pub const fn http_client(&self) -> &C {
        &self.http
    }

    /// Strict GET.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`](crate::Error::Http) for any non-2xx status, including 404.
    pub async fn get_json(&self, url: &str, headers: Headers<'_>) -> Result<JsonResponse> {
        let request = self.build(Method::Get, url, None, headers)?;
        self.call(request).await
    }

    /// GET that treats 404 as absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`](crate::Error::Http) for any non-2xx status other than 404.
    pub async fn get_json_lenient(
        &self,
        url: &str,
        headers: Headers<'_>,
    ) -> Result<Option<JsonResponse>> {
        let request = self.build(Method::Get, url, None, headers)?;
        self.call_lenient(request).await
    }

    /// POST a JSON body.
    pub async fn post_json<T>(&self, url: &str, body: &T, headers: Headers<'_>) -> Result<JsonResponse>
    where
        T: Serialize + ?Sized,
    {
        let request = self.build(Method::Post, url, Some(to_json(body)?), headers)?;
        self.call(request).await
    }

    /// POST without a body or content type.
    pub async fn post_empty(&self, url: &str, headers: Headers<'_>) -> Result<JsonResponse> {
        let request = self.build(Method::Post, url, None, headers)?;
        self.call(request).await
    }

    /// PUT a JSON body.
    pub async fn put_json<T>(&self, url: &str, body: &T, headers: Headers<'_>) -> Result<JsonResponse>
    where
        T: Serialize + ?Sized,
    {
        let request = self.build(Method::Put, url, Some(to_json(body)?), headers)?;
        self.call(request).await
    }

    /// PATCH a JSON body.
    pub async fn patch_json<T>(
        &self,
        url: &str,
        body: &T,
        headers: Headers<'_>,
    ) -> Result<JsonResponse>
    where
        T: Serialize + ?Sized,
    {
        let request = self.build(Method::Patch, url, Some(to_json(body)?), headers)?;
        self.call(request).await
    }

    /// DELETE without a body.
    pub async fn delete_json(&self, url: &str, headers: Headers<'_>) -> Result<JsonResponse> {
        let request = self.build(Method::Delete, url, None, headers)?;
        self.call(request).await
    }

    /// Send a request and return the response whatever its status.
    ///
    /// Default headers are added where the request does not set them.
    /// Use [`Response::error_for_status`] to turn the status into an error.
    ///
    /// # Errors
    ///
    /// Returns an error only when the exchange fails (connection, TLS or
    /// timeout).
    pub async fn send(&self, mut request: Request<Bytes>) -> Result<Response<Bytes>> {
        for (name, value) in &self.default_headers {
            if request.header(name).is_none() {
                request.set_header(name.clone(), value.clone());
            }
        }
        self.execute(request).await
    }

    fn build(
        &self,
        method: Method,
        url: &str,
        body: Option<Bytes>,
        headers: Headers<'_>,
    ) -> Result<Request<Bytes>> {
        let url = Url::parse(url)?;
        let mut builder = Request::builder(method, url);
        for (name, value) in &self.default_headers {
            builder = builder.header(name.clone(), value.clone());
        }
        if let Some(body) = body {
            builder = builder
                .header("Content-Type", ContentType::Json.as_str())
                .body(body);
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        Ok(builder.build())
    }

    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        debug!(method = %request.method(), url = %request.url(), "calling api");
        self.http.execute(request).await
    }

    async fn call(&self, request: Request<Bytes>) -> Result<JsonResponse> {
        let method = request.method();
        let url = request.url().clone();
        let response = self.execute(request).await?;
        let response = response.error_for_status().inspect_err(|err| {
            warn!(%method, %url, status = err.status(), error = %err, "api returned an error");
        })?;
        JsonResponse::from_response(response)
    }

    async fn call_lenient(&self, request: Request<Bytes>) -> Result<Option<JsonResponse>> {
        let method = request.method();
        let url = request.url().clone();
        let response = self.execute(request).await?;
        if response.is_not_found() {
            debug!(%method, %url, "not found, treating as absent");
            return Ok(None);
        }
        let response = response.error_for_status().inspect_err(|err| {
            warn!(%method, %url, status = err.status(), error = %err, "api returned an error");
        })?;
        JsonResponse::from_response(response).map(Some)
    }
}

/// Builder for a hyper-backed [`JsonClient`].
#[derive(Debug, Default)]
pub struct JsonClientBuilder {
    http: HyperClientBuilder,
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
}

impl JsonClientBuilder {
    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.timeout(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.connect_timeout(timeout);
        self
    }

    /// Send `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.http = self.http.with_bearer_auth(token);
        self
    }

    /// Identify the calling application in the `User-Agent`.
    #[must_use]
    pub fn app_name(mut self, name: impl AsRef<str>) -> Self {
        self.user_agent = Some(format!("{DEFAULT_USER_AGENT} ({})", name.as_ref()));
        self
    }

    /// Replace the `User-Agent` entirely.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Log each exchange at info level.
    #[must_use]
    pub fn with_logging(mut self) -> Self {
        self.http = self.http.with_logging();
        self
    }

    /// Log each exchange at debug level, including redacted headers.
    #[must_use]
    pub fn with_debug_logging(mut self) -> Self {
        self.http = self.http.with_debug_logging();
        self
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> JsonClient {
        let mut client = JsonClient::with_http_client(self.http.build());
        if let Some(user_agent) = self.user_agent {
            client = client.with_default_header("User-Agent", user_agent);
        }
        for (name, value) in self.headers {
            client = client.with_default_header(name, value);
        }
        client
    }
}
