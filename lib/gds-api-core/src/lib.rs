//! Core types for the GOV.UK API adapters.
//!
//! This crate provides the transport-agnostic building blocks:
//! - [`Method`] - HTTP method enum
//! - [`Request`] and [`RequestBuilder`] - HTTP request types
//! - [`Response`] and [`JsonResponse`] - raw and JSON-parsed responses
//! - [`Error`], [`HttpErrorKind`] and [`Result`] - typed error taxonomy
//! - [`HttpClient`] - Core client trait for HTTP execution
//! - [`Query`] and [`QueryValue`] - nested (`key[]=v`, `key[sub]=v`) query strings
//! - [`path`] - per-segment percent-encoding of identifiers
//! - [`StatusCode`] - HTTP status codes (re-exported from `http` crate)

mod body;
mod client;
mod error;
mod method;
pub mod path;
pub mod prelude;
pub mod query;
mod request;
mod response;

pub use body::{ContentType, from_json, to_json};
pub use client::HttpClient;
pub use error::{Error, HttpErrorKind, Result};
pub use method::Method;
pub use query::{Query, QueryValue, parse_nested};
pub use request::{Request, RequestBuilder};
pub use response::{JsonResponse, Response};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
