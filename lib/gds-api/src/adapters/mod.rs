//! One adapter per backend service.
//!
//! Adapters are generic over the transport (`C`, defaulting to
//! [`HyperClient`](crate::HyperClient)) so tests and callers can supply
//! their own [`HttpClient`](crate::HttpClient).

mod account_api;
mod content_api;
mod email_alert_api;
mod mapit;
mod publishing_api;
mod support;

pub use account_api::{AUTH_HEADER_NAME, AccountApi};
pub use content_api::ContentApi;
pub use email_alert_api::{EmailAlertApi, Frequency};
pub use mapit::{Area, Location, Mapit};
pub use publishing_api::PublishingApi;
pub use support::Support;
