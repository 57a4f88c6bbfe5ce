//! Prelude module for convenient imports.
//!
//! ```ignore
//! use gds_api_core::prelude::*;
//! ```

pub use crate::{
    ContentType, Error, HttpClient, HttpErrorKind, JsonResponse, Method, Query, QueryValue,
    Request, RequestBuilder, Response, Result, from_json, to_json,
};
