//! Publishing API adapter (content items).

use gds_api_core::{HttpClient, JsonResponse};
use serde::Serialize;

use crate::{Endpoint, HyperClient, JsonClient, Result};

/// Client for the Publishing API.
///
/// Build it over a [`JsonClient`] configured with a bearer token.
#[derive(Debug, Clone)]
pub struct PublishingApi<C = HyperClient> {
    client: JsonClient<C>,
    endpoint: Endpoint,
}

impl PublishingApi {
    /// Adapter over a default client.
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_client(JsonClient::new(), endpoint)
    }

    /// Adapter for the `publishing-api` service found in the environment,
    /// authenticating with `bearer_token`.
    pub fn from_env(bearer_token: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(
            JsonClient::builder().bearer_token(bearer_token).build(),
            Endpoint::for_service("publishing-api")?,
        ))
    }
}

impl<C: HttpClient> PublishingApi<C> {
    /// Adapter over a configured client.
    pub const fn with_client(client: JsonClient<C>, endpoint: Endpoint) -> Self {
        Self { client, endpoint }
    }

    /// Base URL of the service.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Create or replace the draft of a content item.
    ///
    /// A base path reserved by another app answers 409 and an invalid item
    /// 422; both come back as [`Error::Http`](crate::Error::Http) with the
    /// server's message in [`error_message`](crate::Error::error_message).
    pub async fn put_content<T>(&self, content_id: &str, item: &T) -> Result<JsonResponse>
    where
        T: Serialize + ?Sized,
    {
        let url = self.endpoint.join(["v2", "content", content_id])?;
        self.client.put_json(&url, item, &[]).await
    }

    /// A content item, or `None` if it does not exist.
    pub async fn get_content(&self, content_id: &str) -> Result<Option<JsonResponse>> {
        let url = self.endpoint.join(["v2", "content", content_id])?;
        self.client.get_json_lenient(&url, &[]).await
    }
}
