//! Adapters for GOV.UK internal HTTP APIs.
//!
//! Every adapter owns a [`JsonClient`] and the [`Endpoint`] of its backend,
//! and maps each operation onto one HTTP call (or two, for
//! find-or-create).
//!
//! # Example
//!
//! ```ignore
//! use gds_api::prelude::*;
//!
//! let mapit = Mapit::new(Endpoint::for_service("mapit")?);
//! if let Some(location) = mapit.location_for_postcode("SW1A 1AA").await? {
//!     println!("{:?} {:?}", location.lat(), location.lon());
//! }
//!
//! let publishing_api = PublishingApi::with_client(
//!     JsonClient::builder().bearer_token("token").build(),
//!     Endpoint::for_service("publishing-api")?,
//! );
//! match publishing_api.put_content(content_id, &item).await {
//!     Err(err) if err.is_conflict() => eprintln!("{:?}", err.error_message()),
//!     other => { other?; }
//! }
//! ```

pub mod adapters;
mod client;
mod config;
mod connector;
pub mod endpoint;
mod json_client;
pub mod middleware;
pub mod prelude;

pub use adapters::{
    AccountApi, Area, ContentApi, EmailAlertApi, Frequency, Location, Mapit, PublishingApi,
    Support,
};
pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use endpoint::{Endpoint, service_uri};
pub use json_client::{DEFAULT_USER_AGENT, Headers, JsonClient, JsonClientBuilder};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use gds_api_core::{
    ContentType, Error, HttpClient, HttpErrorKind, JsonResponse, Method, Query, QueryValue,
    Request, RequestBuilder, Response, Result, from_json, parse_nested, path, to_json,
};

// Re-export http types for status codes and headers
pub use gds_api_core::{StatusCode, header};
