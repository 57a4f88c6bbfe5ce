//! Account API adapter.

use gds_api_core::{HttpClient, JsonResponse, Query};
use serde::Serialize;
use serde_json::json;

use crate::{Endpoint, HyperClient, JsonClient, Result};

/// Header carrying the opaque account session token.
pub const AUTH_HEADER_NAME: &str = "GOVUK-Account-Session";

/// Client for the GOV.UK Account API.
///
/// Account-scoped calls take the current session value and send it in the
/// [`AUTH_HEADER_NAME`] header. Responses carry a refreshed session the
/// caller is expected to hand back to the user.
#[derive(Debug, Clone)]
pub struct AccountApi<C = HyperClient> {
    client: JsonClient<C>,
    endpoint: Endpoint,
}

impl AccountApi {
    /// Adapter over a default client.
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_client(JsonClient::new(), endpoint)
    }

    /// Adapter for the `account-api` service found in the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Endpoint::for_service("account-api")?))
    }
}

impl<C: HttpClient> AccountApi<C> {
    /// Adapter over a configured client.
    pub const fn with_client(client: JsonClient<C>, endpoint: Endpoint) -> Self {
        Self { client, endpoint }
    }

    /// Base URL of the service.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Get an OAuth sign-in URL to redirect the user to.
    ///
    /// `redirect_path` is where the user lands after authenticating;
    /// `state_id` comes from [`create_registration_state`](Self::create_registration_state).
    pub async fn get_sign_in_url(
        &self,
        redirect_path: Option<&str>,
        state_id: Option<&str>,
    ) -> Result<JsonResponse> {
        let query = Query::compact([("redirect_path", redirect_path), ("state_id", state_id)]);
        let url = query.apply(&self.endpoint.url("/api/oauth2/sign-in"));
        self.client.get_json(&url, &[]).await
    }

    /// Validate the OAuth response from the auth server.
    pub async fn validate_auth_response(&self, code: &str, state: &str) -> Result<JsonResponse> {
        let url = self.endpoint.url("/api/oauth2/callback");
        self.client
            .post_json(&url, &json!({ "code": code, "state": state }), &[])
            .await
    }

    /// Store initial attributes to apply if the user signs up.
    pub async fn create_registration_state<T>(&self, attributes: &T) -> Result<JsonResponse>
    where
        T: Serialize + ?Sized,
    {
        let url = self.endpoint.url("/api/oauth2/state");
        self.client
            .post_json(&url, &AttributesBody { attributes }, &[])
            .await
    }

    /// Whether the user has a Transition Checker email subscription.
    pub async fn check_for_email_subscription(
        &self,
        govuk_account_session: &str,
    ) -> Result<JsonResponse> {
        let url = self.endpoint.url("/api/transition-checker-email-subscription");
        self.client
            .get_json(&url, &[(AUTH_HEADER_NAME, govuk_account_session)])
            .await
    }

    /// Create or update the user's Transition Checker email subscription.
    pub async fn set_email_subscription(
        &self,
        govuk_account_session: &str,
        slug: &str,
    ) -> Result<JsonResponse> {
        let url = self.endpoint.url("/api/transition-checker-email-subscription");
        self.client
            .post_json(
                &url,
                &json!({ "slug": slug }),
                &[(AUTH_HEADER_NAME, govuk_account_session)],
            )
            .await
    }

    /// Look up the values of the named attributes.
    pub async fn get_attributes(
        &self,
        attributes: &[&str],
        govuk_account_session: &str,
    ) -> Result<JsonResponse> {
        let query = Query::new().param("attributes", attributes);
        let url = query.apply(&self.endpoint.url("/api/attributes"));
        self.client
            .get_json(&url, &[(AUTH_HEADER_NAME, govuk_account_session)])
            .await
    }

    /// Create or update attributes for the user.
    pub async fn set_attributes<T>(
        &self,
        attributes: &T,
        govuk_account_session: &str,
    ) -> Result<JsonResponse>
    where
        T: Serialize + ?Sized,
    {
        let url = self.endpoint.url("/api/attributes");
        self.client
            .patch_json(
                &url,
                &AttributesBody { attributes },
                &[(AUTH_HEADER_NAME, govuk_account_session)],
            )
            .await
    }
}

#[derive(Serialize)]
struct AttributesBody<'a, T: ?Sized> {
    attributes: &'a T,
}
