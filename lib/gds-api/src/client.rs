//! hyper-util transport behind every adapter.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use tower::{Layer, ServiceExt};
use tower::util::BoxCloneService;
use tower_service::Service;

use crate::config::{ClientConfig, ClientConfigBuilder};
use crate::connector::https_connector;
use crate::middleware::{BearerAuthLayer, LoggingLayer};
use crate::{Error, Request, Response, Result};

/// Type-erased service the middleware stack is built from.
pub type BoxedService = BoxCloneService<Request<Bytes>, Response<Bytes>, Error>;

/// Future returned by [`HyperClient`] as a tower service.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response<Bytes>>> + Send + 'static>>;

type WrapFn = Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>;

/// Wait for `future` at most `limit`.
async fn within<T, E>(
    limit: Duration,
    future: impl Future<Output = std::result::Result<T, E>>,
) -> std::result::Result<std::result::Result<T, E>, Error> {
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| Error::Timeout)
}

/// Pooled hyper client at the bottom of the stack.
#[derive(Clone)]
struct Transport {
    hyper: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    timeout: Duration,
}

impl Transport {
    fn new(config: &ClientConfig) -> Self {
        let hyper = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(https_connector(config.connect_timeout));
        Self {
            hyper,
            timeout: config.timeout,
        }
    }

    async fn send(self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let request = to_hyper(request)?;

        let response = within(self.timeout, self.hyper.request(request))
            .await?
            .map_err(|err| classify(&err))?;
        let status = response.status().as_u16();
        let headers = from_header_map(response.headers());

        // The body gets its own budget: a slow trickle after fast headers
        // still counts as a timeout.
        let body = within(self.timeout, response.into_body().collect())
            .await?
            .map_err(|err| Error::connection(err.to_string()))?
            .to_bytes();

        Ok(Response::new(status, headers, body))
    }
}

impl Service<Request<Bytes>> for Transport {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        Box::pin(self.clone().send(request))
    }
}

fn to_hyper(request: Request<Bytes>) -> Result<http::Request<Full<Bytes>>> {
    let (method, url, headers, body) = request.into_parts();
    let builder = headers.iter().fold(
        http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str()),
        |builder, (name, value)| builder.header(name.as_str(), value.as_str()),
    );
    builder
        .body(body.map_or_else(Full::default, Full::new))
        .map_err(|err| Error::invalid_request(err.to_string()))
}

/// Names come back lower-cased; non-UTF-8 values are dropped.
fn from_header_map(headers: &http::HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_owned())))
        .collect()
}

/// Map a hyper failure onto the error taxonomy.
///
/// Connect timeouts and TLS failures both surface as connect errors, so the
/// whole cause chain is inspected.
fn classify(err: &(dyn std::error::Error + 'static)) -> Error {
    let chain = std::iter::successors(Some(err), |cause| cause.source());
    let timed_out = chain.clone().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::TimedOut)
    });
    if timed_out {
        return Error::Timeout;
    }

    let message = chain
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ");
    let lower = message.to_ascii_lowercase();
    if ["ssl", "tls", "certificate"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        Error::tls(message)
    } else {
        Error::connection(message)
    }
}

/// HTTP transport with connection pooling, TLS and a tower middleware
/// stack.
///
/// Every HTTP status comes back as a [`Response`]; only connection
/// failures, TLS failures and timeouts are errors at this level.
///
/// # Example
///
/// ```ignore
/// use gds_api::HyperClient;
/// use std::time::Duration;
///
/// let client = HyperClient::builder()
///     .timeout(Duration::from_secs(10))
///     .with_logging()
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperClient {
    // `BoxCloneService` is `Send` but not `Sync`; each call clones it out.
    stack: Arc<Mutex<BoxedService>>,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// Client with the default configuration and no middleware.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Client with `config` and no middleware.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        Self::from_stack(BoxCloneService::new(Transport::new(&config)), config)
    }

    /// Start configuring a client.
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn from_stack(stack: BoxedService, config: ClientConfig) -> Self {
        Self {
            stack: Arc::new(Mutex::new(stack)),
            config,
        }
    }

    fn dispatch(&self, request: Request<Bytes>) -> ServiceFuture {
        let service = self
            .stack
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Box::pin(service.oneshot(request))
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl gds_api_core::HttpClient for HyperClient {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        self.dispatch(request).await
    }
}

impl Service<Request<Bytes>> for HyperClient {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        self.dispatch(request)
    }
}

/// Builder for [`HyperClient`].
#[derive(Default)]
pub struct HyperClientBuilder {
    config: ClientConfigBuilder,
    wrappers: Vec<WrapFn>,
}

impl std::fmt::Debug for HyperClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClientBuilder")
            .field("config", &self.config)
            .field("layers", &self.wrappers.len())
            .finish()
    }
}

impl HyperClientBuilder {
    /// Per-request timeout (headers and body each).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// TCP connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Idle connections kept per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config = self.config.pool_idle_per_host(count);
        self
    }

    /// How long an idle connection is kept.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    /// Wrap the stack in a tower layer. The first layer added is the
    /// innermost.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send,
    {
        self.wrappers
            .push(Arc::new(move |inner| BoxCloneService::new(layer.layer(inner))));
        self
    }

    /// Send `Authorization: Bearer <token>` unless a request sets its own.
    #[must_use]
    pub fn with_bearer_auth(self, token: impl Into<String>) -> Self {
        self.layer(BearerAuthLayer::new(token))
    }

    /// Log each exchange at info level.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Log each exchange at debug level, with redacted headers.
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> HyperClient {
        let config = self.config.build();
        let base: BoxedService = BoxCloneService::new(Transport::new(&config));
        let stack = self.wrappers.iter().fold(base, |stack, wrap| wrap(stack));
        HyperClient::from_stack(stack, config)
    }
}
