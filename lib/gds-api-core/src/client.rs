//! HTTP client trait.
//!
//! [`HttpClient`] is the seam between the adapters and the network. The
//! `gds-api` crate ships a hyper-based implementation; tests and callers
//! with special needs can provide their own.

use std::future::Future;

use bytes::Bytes;

use crate::{Request, Response, Result};

/// Core HTTP client trait.
///
/// Implementations return a [`Response`] for every status the server
/// answers with. Mapping statuses onto errors happens above this layer, so
/// an `Err` from `execute` always means the exchange itself failed.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}
