//! Support adapter.

use gds_api_core::{HttpClient, JsonResponse};
use serde::Serialize;

use crate::{Endpoint, HyperClient, JsonClient, Result};

/// Client for the Support app.
#[derive(Debug, Clone)]
pub struct Support<C = HyperClient> {
    client: JsonClient<C>,
    endpoint: Endpoint,
}

impl Support {
    /// Adapter over a default client.
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_client(JsonClient::new(), endpoint)
    }

    /// Adapter for the `support` service found in the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Endpoint::for_service("support")?))
    }
}

impl<C: HttpClient> Support<C> {
    /// Adapter over a configured client.
    pub const fn with_client(client: JsonClient<C>, endpoint: Endpoint) -> Self {
        Self { client, endpoint }
    }

    /// Base URL of the service.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Raise a freedom of information request.
    pub async fn create_foi_request<T>(&self, request_details: &T) -> Result<JsonResponse>
    where
        T: Serialize + ?Sized,
    {
        let url = self.endpoint.url("/foi_requests");
        self.client
            .post_json(&url, &FoiRequest { foi_request: request_details }, &[])
            .await
    }
}

#[derive(Serialize)]
struct FoiRequest<'a, T: ?Sized> {
    foi_request: &'a T,
}
