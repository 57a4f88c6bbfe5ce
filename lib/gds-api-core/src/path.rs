//! Path segment encoding.
//!
//! Identifiers supplied by callers (content IDs, postcodes, slugs) are
//! encoded one segment at a time so that a `/` or `?` inside a value can
//! never change which resource is addressed. `.` and `..` are rejected
//! outright: URL parsing collapses them even when percent-encoded.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::{Error, Result};

/// Characters escaped inside a single path segment.
///
/// Unreserved characters (`A-Z a-z 0-9 - . _ ~`) pass through unchanged.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b';')
    .add(b'=')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'|');

/// Percent-encode a single path segment.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for `.` and `..`, which would
/// address the current or parent resource instead.
///
/// # Example
///
/// ```
/// use gds_api_core::path;
///
/// assert_eq!(path::segment("SW1A 1AA").unwrap(), "SW1A%201AA");
/// assert_eq!(path::segment("../admin").unwrap(), "..%2Fadmin");
/// assert!(path::segment("..").is_err());
/// ```
pub fn segment(value: impl std::fmt::Display) -> Result<String> {
    let value = value.to_string();
    if value == "." || value == ".." {
        return Err(Error::invalid_argument(format!(
            "{value:?} is not a valid path segment"
        )));
    }
    Ok(utf8_percent_encode(&value, PATH_SEGMENT_ENCODE_SET).to_string())
}

/// Join an endpoint and raw path segments into a URL string.
///
/// Every segment is encoded with [`segment`]; the endpoint is used as is
/// (minus a trailing slash).
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if any segment is `.` or `..`.
///
/// # Example
///
/// ```
/// use gds_api_core::path;
///
/// let url = path::join("http://mapit.dev.gov.uk/", ["code", "gss", "E0 9/1"]).unwrap();
/// assert_eq!(url, "http://mapit.dev.gov.uk/code/gss/E0%209%2F1");
/// ```
pub fn join<I, S>(endpoint: &str, segments: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: std::fmt::Display,
{
    let mut url = endpoint.trim_end_matches('/').to_owned();
    for value in segments {
        url.push('/');
        url.push_str(&segment(value)?);
    }
    Ok(url)
}
