//! Content item scenarios against a Publishing API double.

use assert2::{check, let_assert};
use gds_api::{Endpoint, HttpErrorKind, JsonClient, PublishingApi};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

const CONTENT_ID: &str = "bed722e6-db68-43e5-9079-063f623335a7";

fn content_item(overrides: &Value) -> Value {
    let mut item = json!({
        "base_path": "/robots.txt",
        "content_id": CONTENT_ID,
        "title": "Instructions for crawler robots",
        "description": "robots.txt provides rules for which parts of GOV.UK are permitted to be crawled by different bots.",
        "schema_name": "special_route",
        "document_type": "special_route",
        "public_updated_at": "2015-07-30T13:58:11.000Z",
        "publishing_app": "static",
        "rendering_app": "static",
        "locale": "en",
        "routes": [{ "path": "/robots.txt", "type": "exact" }],
        "update_type": "major"
    });
    if let (Some(item), Some(overrides)) = (item.as_object_mut(), overrides.as_object()) {
        for (key, value) in overrides {
            item.insert(key.clone(), value.clone());
        }
    }
    item
}

fn api(server: &MockServer) -> PublishingApi {
    PublishingApi::with_client(
        JsonClient::builder().bearer_token("example-token").build(),
        Endpoint::parse(server.uri()).expect("endpoint"),
    )
}

#[tokio::test]
async fn put_content_creates_draft() {
    let mock_server = MockServer::start().await;
    let item = content_item(&json!({}));

    Mock::given(method("PUT"))
        .and(path(format!("/v2/content/{CONTENT_ID}")))
        .and(header("Content-Type", "application/json"))
        .and(header("Authorization", "Bearer example-token"))
        .and(body_json(&item))
        .respond_with(ResponseTemplate::new(200).set_body_json(&item))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = api(&mock_server)
        .put_content(CONTENT_ID, &item)
        .await
        .expect("created");

    check!(response.status() == 200);
    check!(response["content_id"] == json!(CONTENT_ID));
}

#[tokio::test]
async fn put_content_conflict_when_path_reserved() {
    let mock_server = MockServer::start().await;
    let item = content_item(&json!({ "base_path": "/test-item", "publishing_app": "whitehall" }));

    Mock::given(method("PUT"))
        .and(path(format!("/v2/content/{CONTENT_ID}")))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {
                "code": 409,
                "message": "Conflict",
                "fields": {
                    "base_path": ["is already in use by the 'publisher' app"]
                }
            }
        })))
        .mount(&mock_server)
        .await;

    let err = api(&mock_server)
        .put_content(CONTENT_ID, &item)
        .await
        .expect_err("conflict");

    check!(err.is_conflict());
    check!(err.kind() == Some(HttpErrorKind::Conflict));
    check!(err.error_message().as_deref() == Some("Conflict"));
    let_assert!(Some(details) = err.error_details());
    check!(details["error"]["fields"]["base_path"][0] == json!("is already in use by the 'publisher' app"));
}

#[tokio::test]
async fn put_content_unprocessable_when_invalid() {
    let mock_server = MockServer::start().await;
    let item = content_item(&json!({ "base_path": "not a url path" }));

    Mock::given(method("PUT"))
        .and(path(format!("/v2/content/{CONTENT_ID}")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": {
                "code": 422,
                "message": "Unprocessable entity",
                "fields": { "base_path": ["is invalid"] }
            }
        })))
        .mount(&mock_server)
        .await;

    let err = api(&mock_server)
        .put_content(CONTENT_ID, &item)
        .await
        .expect_err("invalid");

    check!(err.kind() == Some(HttpErrorKind::UnprocessableEntity));
    check!(err.error_message().as_deref() == Some("Unprocessable entity"));
}

#[tokio::test]
async fn get_content_returns_item() {
    let mock_server = MockServer::start().await;
    let item = content_item(&json!({ "publishing_app": "publisher" }));

    Mock::given(method("GET"))
        .and(path(format!("/v2/content/{CONTENT_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&item))
        .mount(&mock_server)
        .await;

    let response = api(&mock_server)
        .get_content(CONTENT_ID)
        .await
        .expect("response");

    let_assert!(Some(response) = response);
    check!(response["publishing_app"] == json!("publisher"));
    check!(response["content_id"] == json!(CONTENT_ID));
}

#[tokio::test]
async fn get_content_missing_returns_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v2/content/{CONTENT_ID}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "not found" }
        })))
        .mount(&mock_server)
        .await;

    let response = api(&mock_server)
        .get_content(CONTENT_ID)
        .await
        .expect("404 is not an error");

    check!(response.is_none());
}

#[tokio::test]
async fn dot_segment_content_ids_are_rejected_before_sending() {
    let mock_server = MockServer::start().await;

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hit": "v2 root" })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let api = api(&mock_server);
    for content_id in [".", ".."] {
        let result = api.get_content(content_id).await;
        let_assert!(Err(err) = result);
        check!(err.is_invalid_argument());

        let result = api.put_content(content_id, &content_item(&json!({}))).await;
        let_assert!(Err(err) = result);
        check!(err.is_invalid_argument());
    }

    let requests = mock_server.received_requests().await.expect("recording enabled");
    check!(requests.is_empty());
}
