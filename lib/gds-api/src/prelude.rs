//! Prelude module for convenient imports.
//!
//! ```ignore
//! use gds_api::prelude::*;
//! ```

pub use crate::{
    AccountApi, ContentApi, EmailAlertApi, Endpoint, Error, Frequency, HttpClient, HttpErrorKind,
    HyperClient, JsonClient, JsonResponse, Mapit, PublishingApi, Query, Result, Support,
};
pub use serde::{Deserialize, Serialize};
