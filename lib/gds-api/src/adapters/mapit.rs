//! Mapit adapter: postcode and area lookups.

use std::collections::BTreeMap;

use gds_api_core::{HttpClient, JsonResponse, path};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{Endpoint, HyperClient, JsonClient, Result};

/// Client for Mapit.
///
/// Every lookup is lenient: an unknown postcode, area type or code yields
/// `Ok(None)`.
#[derive(Debug, Clone)]
pub struct Mapit<C = HyperClient> {
    client: JsonClient<C>,
    endpoint: Endpoint,
}

impl Mapit {
    /// Adapter over a default client.
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_client(JsonClient::new(), endpoint)
    }

    /// Adapter for the `mapit` service found in the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Endpoint::for_service("mapit")?))
    }
}

impl<C: HttpClient> Mapit<C> {
    /// Adapter over a configured client.
    pub const fn with_client(client: JsonClient<C>, endpoint: Endpoint) -> Self {
        Self { client, endpoint }
    }

    /// Base URL of the service.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Location of a postcode.
    pub async fn location_for_postcode(&self, postcode: &str) -> Result<Option<Location>> {
        let url = self
            .endpoint
            .url(&format!("/postcode/{}.json", path::segment(postcode)?));
        let response = self.client.get_json_lenient(&url, &[]).await?;
        Ok(response.map(Location::from))
    }

    /// All areas of one type, keyed by area id.
    pub async fn areas_for_type(&self, area_type: &str) -> Result<Option<JsonResponse>> {
        let url = self
            .endpoint
            .url(&format!("/areas/{}.json", path::segment(area_type)?));
        self.client.get_json_lenient(&url, &[]).await
    }

    /// The area registered under `code` in the `code_type` scheme (e.g. `gss`).
    pub async fn area_for_code(&self, code_type: &str, code: &str) -> Result<Option<JsonResponse>> {
        let url = self.endpoint.url(&format!(
            "/code/{}/{}.json",
            path::segment(code_type)?,
            path::segment(code)?
        ));
        self.client.get_json_lenient(&url, &[]).await
    }
}

/// Result of a postcode lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    response: Value,
}

impl Location {
    /// Latitude (WGS84).
    #[must_use]
    pub fn lat(&self) -> Option<f64> {
        self.response.get("wgs84_lat").and_then(Value::as_f64)
    }

    /// Longitude (WGS84).
    #[must_use]
    pub fn lon(&self) -> Option<f64> {
        self.response.get("wgs84_lon").and_then(Value::as_f64)
    }

    /// Normalised postcode.
    #[must_use]
    pub fn postcode(&self) -> Option<&str> {
        self.response.get("postcode").and_then(Value::as_str)
    }

    /// Country the postcode is in.
    #[must_use]
    pub fn country_name(&self) -> Option<&str> {
        self.response.get("country_name").and_then(Value::as_str)
    }

    /// Areas containing the postcode.
    ///
    /// Entries that are not JSON objects are skipped.
    #[must_use]
    pub fn areas(&self) -> Vec<Area> {
        let Some(Value::Object(areas)) = self.response.get("areas") else {
            return Vec::new();
        };
        areas
            .values()
            .filter_map(|area| Area::deserialize(area).ok())
            .collect()
    }

    /// The raw lookup response.
    #[must_use]
    pub const fn response(&self) -> &Value {
        &self.response
    }
}

impl From<JsonResponse> for Location {
    fn from(response: JsonResponse) -> Self {
        Self {
            response: response.into_value().unwrap_or_default(),
        }
    }
}

impl From<Value> for Location {
    fn from(response: Value) -> Self {
        Self { response }
    }
}

/// One Mapit area.
///
/// The common fields are typed; everything else stays reachable through
/// [`Area::get`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Area {
    /// Mapit area id.
    pub id: Option<u64>,
    /// Display name.
    pub name: String,
    /// Area type code, e.g. `WMC` or `EUR`.
    #[serde(rename = "type")]
    pub area_type: String,
    /// Country name, if Mapit records one.
    pub country_name: Option<String>,
    /// External codes by scheme, e.g. `gss` or `ons`.
    pub codes: BTreeMap<String, String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Area {
    /// Any field not covered by the typed ones.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Code for one scheme.
    #[must_use]
    pub fn code(&self, scheme: &str) -> Option<&str> {
        self.codes.get(scheme).map(String::as_str)
    }
}
