//! Content API adapter.

use gds_api_core::{HttpClient, JsonResponse, Query, path};

use crate::{Endpoint, HyperClient, JsonClient, Result};

/// Client for the Content API.
#[derive(Debug, Clone)]
pub struct ContentApi<C = HyperClient> {
    client: JsonClient<C>,
    endpoint: Endpoint,
}

impl ContentApi {
    /// Adapter over a default client.
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_client(JsonClient::new(), endpoint)
    }

    /// Adapter for the `contentapi` service found in the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Endpoint::for_service("contentapi")?))
    }
}

impl<C: HttpClient> ContentApi<C> {
    /// Adapter over a configured client.
    pub const fn with_client(client: JsonClient<C>, endpoint: Endpoint) -> Self {
        Self { client, endpoint }
    }

    /// Base URL of the service.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// All section tags.
    pub async fn sections(&self) -> Result<JsonResponse> {
        let url = Query::new()
            .param("type", "section")
            .apply(&self.endpoint.url("/tags.json"));
        self.client.get_json(&url, &[]).await
    }

    /// Artefacts tagged with `tag`, including child tags.
    pub async fn with_tag(&self, tag: &str) -> Result<JsonResponse> {
        let url = Query::new()
            .param("tag", tag)
            .param("include_children", "1")
            .apply(&self.endpoint.url("/with_tag.json"));
        self.client.get_json(&url, &[]).await
    }

    /// A local authority by SNAC code, or `None` if there is none.
    pub async fn local_authority(&self, snac_code: &str) -> Result<Option<JsonResponse>> {
        let url = self
            .endpoint
            .url(&format!("/local_authorities/{}.json", path::segment(snac_code)?));
        self.client.get_json_lenient(&url, &[]).await
    }

    /// Local authorities whose name matches `name`.
    pub async fn local_authorities_by_name(&self, name: &str) -> Result<JsonResponse> {
        let url = Query::new()
            .param("name", name)
            .apply(&self.endpoint.url("/local_authorities.json"));
        self.client.get_json(&url, &[]).await
    }

    /// Local authorities whose SNAC code matches `snac_code`.
    pub async fn local_authorities_by_snac_code(&self, snac_code: &str) -> Result<JsonResponse> {
        let url = Query::new()
            .param("snac_code", snac_code)
            .apply(&self.endpoint.url("/local_authorities.json"));
        self.client.get_json(&url, &[]).await
    }
}
