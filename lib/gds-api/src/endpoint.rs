//! Service endpoints and discovery.
//!
//! Every adapter is bound to one [`Endpoint`], the base URL of a backend
//! service. Endpoints can be given explicitly or discovered from the
//! environment the way GOV.UK applications find each other:
//!
//! 1. `PLEK_SERVICE_<NAME>_URI` (service name upper-cased, `-` → `_`)
//!    overrides everything;
//! 2. otherwise `<scheme>://<name>.<GOVUK_APP_DOMAIN>`, where the domain
//!    defaults to `dev.gov.uk` and the scheme is `http` only on that
//!    development domain.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use gds_api_core::path;
use url::Url;

use crate::{Error, Result};

/// App domain used when `GOVUK_APP_DOMAIN` is unset.
pub const DEFAULT_APP_DOMAIN: &str = "dev.gov.uk";

/// Base URL of one backend service.
///
/// Stored without a trailing slash so paths can be appended directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(Arc<str>);

impl Endpoint {
    /// Parse and validate a base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the string is not an absolute URL.
    pub fn parse(base_url: impl AsRef<str>) -> Result<Self> {
        let raw = base_url.as_ref().trim().trim_end_matches('/');
        Url::parse(raw)?;
        Ok(Self(Arc::from(raw)))
    }

    /// Discover a service endpoint from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the resolved URL is malformed.
    pub fn for_service(service: &str) -> Result<Self> {
        Self::resolve(service, |name| std::env::var(name).ok())
    }

    /// Discover a service endpoint using `lookup` to read variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the resolved URL is malformed.
    pub fn resolve(service: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let override_var = format!(
            "PLEK_SERVICE_{}_URI",
            service.to_ascii_uppercase().replace('-', "_")
        );
        if let Some(uri) = lookup(&override_var).filter(|uri| !uri.trim().is_empty()) {
            tracing::debug!(service, %override_var, "using endpoint override");
            return Self::parse(uri);
        }

        let domain = lookup("GOVUK_APP_DOMAIN")
            .filter(|domain| !domain.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_APP_DOMAIN.to_owned());
        let scheme = if domain == DEFAULT_APP_DOMAIN {
            "http"
        } else {
            "https"
        };
        Self::parse(format!("{scheme}://{service}.{domain}"))
    }

    /// The base URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a literal path (which must start with `/`).
    #[must_use]
    pub fn url(&self, literal_path: &str) -> String {
        format!("{}{literal_path}", self.0)
    }

    /// Append path segments, percent-encoding each one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if a segment is `.` or `..`.
    pub fn join<I, S>(&self, segments: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: fmt::Display,
    {
        path::join(&self.0, segments)
    }
}

/// Resolve the base URL of `service` from the process environment.
///
/// Shorthand for [`Endpoint::for_service`].
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] if the resolved URL is malformed.
pub fn service_uri(service: &str) -> Result<Endpoint> {
    Endpoint::for_service(service)
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
