//! Email Alert API adapter.
//!
//! Covers subscriber lists, content changes and messages, subscriptions,
//! and subscriber verification.

use std::fmt;

use gds_api_core::{HttpClient, JsonResponse, Query, QueryValue};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{Endpoint, Error, Headers, HyperClient, JsonClient, Result};

/// Attributes forwarded from a subscriber list lookup to the query string.
const SUBSCRIBER_LIST_FILTERS: [&str; 7] = [
    "tags",
    "links",
    "document_type",
    "email_document_supertype",
    "government_document_supertype",
    "gov_delivery_id",
    "combine_mode",
];

/// How often a subscriber is emailed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// One email per change.
    #[default]
    Immediately,
    /// A daily digest.
    Daily,
    /// A weekly digest.
    Weekly,
}

impl Frequency {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Immediately => "immediately",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client for the Email Alert API.
#[derive(Debug, Clone)]
pub struct EmailAlertApi<C = HyperClient> {
    client: JsonClient<C>,
    endpoint: Endpoint,
}

impl EmailAlertApi {
    /// Adapter over a default client.
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_client(JsonClient::new(), endpoint)
    }

    /// Adapter for the `email-alert-api` service found in the environment,
    /// authenticating with `bearer_token`.
    pub fn from_env(bearer_token: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(
            JsonClient::builder().bearer_token(bearer_token).build(),
            Endpoint::for_service("email-alert-api")?,
        ))
    }
}

impl<C: HttpClient> EmailAlertApi<C> {
    /// Adapter over a configured client.
    pub const fn with_client(client: JsonClient<C>, endpoint: Endpoint) -> Self {
        Self { client, endpoint }
    }

    /// Base URL of the service.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Find the subscriber list matching `attributes`, creating it if the
    /// lookup comes back 404.
    ///
    /// Not atomic: two callers racing on the same attributes may both
    /// create a list.
    pub async fn find_or_create_subscriber_list(&self, attributes: &Value) -> Result<JsonResponse> {
        match self.lookup_subscriber_list(attributes).await? {
            Some(found) => Ok(found),
            None => self.create_subscriber_list(attributes).await,
        }
    }

    /// Find the subscriber list matching `attributes`.
    ///
    /// Recognised attributes are `tags`, `links`, `document_type`,
    /// `email_document_supertype`, `government_document_supertype`,
    /// `gov_delivery_id` and `combine_mode`; `null` and `false` values are
    /// left out of the query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] without sending anything when
    /// both `tags` and `links` are given, or when `attributes` is not an
    /// object.
    pub async fn find_subscriber_list(&self, attributes: &Value) -> Result<JsonResponse> {
        let url = self.subscriber_list_url(attributes)?;
        self.client.get_json(&url, &[]).await
    }

    async fn lookup_subscriber_list(&self, attributes: &Value) -> Result<Option<JsonResponse>> {
        let url = self.subscriber_list_url(attributes)?;
        self.client.get_json_lenient(&url, &[]).await
    }

    fn subscriber_list_url(&self, attributes: &Value) -> Result<String> {
        if !attributes.is_object() {
            return Err(Error::invalid_argument(
                "subscriber list attributes must be a JSON object",
            ));
        }
        if present(attributes, "tags").is_some() && present(attributes, "links").is_some() {
            return Err(Error::invalid_argument(
                "please provide either tags or links (or neither), but not both",
            ));
        }

        let query = Query::compact(SUBSCRIBER_LIST_FILTERS.iter().map(|&key| {
            (
                key,
                present(attributes, key).and_then(QueryValue::from_json),
            )
        }));
        Ok(query.apply(&self.endpoint.url("/subscriber-lists")))
    }

    /// Create a subscriber list.
    pub async fn create_subscriber_list<T>(&self, attributes: &T) -> Result<JsonResponse>
    where
        T: Serialize + ?Sized,
    {
        let url = self.endpoint.url("/subscriber-lists");
        self.client.post_json(&url, attributes, &[]).await
    }

    /// Notify subscribers of a content change.
    pub async fn create_content_change<T>(
        &self,
        content_change: &T,
        headers: Headers<'_>,
    ) -> Result<JsonResponse>
    where
        T: Serialize + ?Sized,
    {
        let url = self.endpoint.url("/content-changes");
        self.client.post_json(&url, content_change, headers).await
    }

    /// Send a message to subscribers.
    pub async fn create_message<T>(&self, message: &T, headers: Headers<'_>) -> Result<JsonResponse>
    where
        T: Serialize + ?Sized,
    {
        let url = self.endpoint.url("/messages");
        self.client.post_json(&url, message, headers).await
    }

    /// Send a single email (`address`, `subject`, `body`).
    pub async fn create_email<T>(&self, email: &T) -> Result<JsonResponse>
    where
        T: Serialize + ?Sized,
    {
        let url = self.endpoint.url("/emails");
        self.client.post_json(&url, email, &[]).await
    }

    /// Tell subscribers that content has been unpublished.
    pub async fn send_unpublish_message<T>(&self, message: &T) -> Result<JsonResponse>
    where
        T: Serialize + ?Sized,
    {
        let url = self.endpoint.url("/unpublish-messages");
        self.client.post_json(&url, message, &[]).await
    }

    /// Subscriber lists matching `attributes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `attributes` is not an object.
    pub async fn topic_matches(&self, attributes: &Value) -> Result<JsonResponse> {
        let url = Query::from_json(attributes)?.apply(&self.endpoint.url("/topic-matches.json"));
        self.client.get_json(&url, &[]).await
    }

    /// End a subscription.
    pub async fn unsubscribe(&self, uuid: &str) -> Result<JsonResponse> {
        let url = self.endpoint.join(["unsubscribe", uuid])?;
        self.client.post_empty(&url, &[]).await
    }

    /// End every subscription a subscriber has.
    pub async fn unsubscribe_subscriber(&self, id: impl fmt::Display) -> Result<JsonResponse> {
        let url = self.endpoint.join(["subscribers".to_owned(), id.to_string()])?;
        self.client.delete_json(&url, &[]).await
    }

    /// Subscribe `address` to a subscriber list.
    pub async fn subscribe(
        &self,
        subscriber_list_id: impl Into<Value>,
        address: &str,
        frequency: Frequency,
    ) -> Result<JsonResponse> {
        let url = self.endpoint.url("/subscriptions");
        let body = json!({
            "subscriber_list_id": subscriber_list_id.into(),
            "address": address,
            "frequency": frequency.as_str(),
        });
        self.client.post_json(&url, &body, &[]).await
    }

    /// A subscriber list by slug.
    pub async fn get_subscriber_list(&self, slug: &str) -> Result<JsonResponse> {
        let url = self.endpoint.join(["subscriber-lists", slug])?;
        self.client.get_json(&url, &[]).await
    }

    /// A subscription by id.
    pub async fn get_subscription(&self, id: &str) -> Result<JsonResponse> {
        let url = self.endpoint.join(["subscriptions", id])?;
        self.client.get_json(&url, &[]).await
    }

    /// The latest subscription with the same list and subscriber as `id`,
    /// which may be `id` itself.
    pub async fn get_latest_matching_subscription(&self, id: &str) -> Result<JsonResponse> {
        let url = self.endpoint.join(["subscriptions", id, "latest"])?;
        self.client.get_json(&url, &[]).await
    }

    /// A subscriber's subscriptions, optionally ordered (`title`,
    /// `created_at`).
    pub async fn get_subscriptions(
        &self,
        id: impl fmt::Display,
        order: Option<&str>,
    ) -> Result<JsonResponse> {
        let url = self.endpoint.join([
            "subscribers".to_owned(),
            id.to_string(),
            "subscriptions".to_owned(),
        ])?;
        let url = Query::new().opt("order", order).apply(&url);
        self.client.get_json(&url, &[]).await
    }

    /// Change a subscriber's email address.
    pub async fn change_subscriber(
        &self,
        id: impl fmt::Display,
        new_address: &str,
    ) -> Result<JsonResponse> {
        let url = self.endpoint.join(["subscribers".to_owned(), id.to_string()])?;
        self.client
            .patch_json(&url, &json!({ "new_address": new_address }), &[])
            .await
    }

    /// Change how often a subscription sends email.
    pub async fn change_subscription(&self, id: &str, frequency: Frequency) -> Result<JsonResponse> {
        let url = self.endpoint.join(["subscriptions", id])?;
        self.client
            .patch_json(&url, &json!({ "frequency": frequency.as_str() }), &[])
            .await
    }

    /// Email a subscriber a link proving they control `address`.
    ///
    /// `redirect` is sent as `null` when absent.
    pub async fn send_subscriber_verification_email(
        &self,
        address: &str,
        destination: &str,
        redirect: Option<&str>,
    ) -> Result<JsonResponse> {
        let url = self.endpoint.url("/subscribers/auth-token");
        let body = json!({
            "address": address,
            "destination": destination,
            "redirect": redirect,
        });
        self.client.post_json(&url, &body, &[]).await
    }

    /// Email a link confirming a subscription to `topic_id`.
    pub async fn send_subscription_verification_email(
        &self,
        address: &str,
        frequency: Frequency,
        topic_id: &str,
    ) -> Result<JsonResponse> {
        let url = self.endpoint.url("/subscriptions/auth-token");
        let body = json!({
            "address": address,
            "frequency": frequency.as_str(),
            "topic_id": topic_id,
        });
        self.client.post_json(&url, &body, &[]).await
    }

    /// An OIDC auth URL and nonce for verifying the user's account.
    pub async fn get_oidc_url(&self, destination: &str) -> Result<JsonResponse> {
        let url = Query::new()
            .param("destination", destination)
            .apply(&self.endpoint.url("/subscribers/oidc"));
        self.client.get_json(&url, &[]).await
    }

    /// Validate an OIDC response and fetch the matching subscriber.
    pub async fn verify_oidc_response(
        &self,
        code: &str,
        nonce: &str,
        destination: &str,
    ) -> Result<JsonResponse> {
        let url = self.endpoint.url("/subscribers/oidc");
        let body = json!({
            "code": code,
            "nonce": nonce,
            "destination": destination,
        });
        self.client.post_json(&url, &body, &[]).await
    }
}

/// An attribute counts as given unless it is missing, `null` or `false`.
fn present<'a>(attributes: &'a Value, key: &str) -> Option<&'a Value> {
    attributes
        .get(key)
        .filter(|value| !matches!(value, Value::Null | Value::Bool(false)))
}
