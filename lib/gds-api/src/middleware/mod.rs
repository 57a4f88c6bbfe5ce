//! Tower middleware layers for the HTTP transport.
//!
//! Layers wrap [`HyperClient`](crate::HyperClient) through
//! [`HyperClientBuilder::layer`](crate::HyperClientBuilder::layer) and the
//! `with_*` helpers. The first layer added is the innermost.
//!
//! - [`LoggingLayer`] - Logs requests/responses using `tracing`, with
//!   credentials redacted
//! - [`BearerAuthLayer`] - Adds `Authorization: Bearer <token>` unless the
//!   request already carries an `Authorization` header
//!
//! # Example
//!
//! ```ignore
//! use gds_api::HyperClient;
//! use gds_api::middleware::LoggingLayer;
//!
//! let client = HyperClient::builder()
//!     .with_bearer_auth("publishing-api-token")
//!     .layer(LoggingLayer::debug())
//!     .build();
//! ```

mod bearer_auth;
mod logging;

pub use bearer_auth::{BearerAuth, BearerAuthLayer};
pub use logging::{LogLevel, Logging, LoggingLayer, SENSITIVE_HEADERS};

pub use tower::{Layer, ServiceBuilder};
