//! Email Alert API adapter against a wiremock double.

use assert2::{check, let_assert};
use gds_api::{EmailAlertApi, Endpoint, Frequency};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param, query_param_is_missing},
};

fn api(server: &MockServer) -> EmailAlertApi {
    EmailAlertApi::new(Endpoint::parse(server.uri()).expect("endpoint"))
}

fn subscriber_list() -> serde_json::Value {
    json!({
        "subscriber_list": {
            "id": 1,
            "slug": "travel-advice",
            "title": "Travel advice",
            "links": { "countries": ["uuid-1"] }
        }
    })
}

#[tokio::test]
async fn find_subscriber_list_encodes_nested_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscriber-lists"))
        .and(query_param("links[countries][]", "uuid-1"))
        .and(query_param("document_type", "travel_advice"))
        .and(query_param_is_missing("combine_mode"))
        .and(query_param_is_missing("tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(subscriber_list()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = api(&mock_server)
        .find_subscriber_list(&json!({
            "links": { "countries": ["uuid-1"] },
            "document_type": "travel_advice",
            "combine_mode": null
        }))
        .await
        .expect("found");

    check!(response["subscriber_list"]["slug"] == json!("travel-advice"));
}

#[tokio::test]
async fn find_subscriber_list_rejects_tags_and_links_without_io() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = api(&mock_server)
        .find_subscriber_list(&json!({
            "tags": { "topics": ["oil-and-gas/licensing"] },
            "links": { "topics": ["uuid-1"] }
        }))
        .await
        .expect_err("conflicting filters");

    check!(err.is_invalid_argument());
    let requests = mock_server.received_requests().await.expect("recording enabled");
    check!(requests.is_empty());
}

#[tokio::test]
async fn find_subscriber_list_missing_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscriber-lists"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let err = api(&mock_server)
        .find_subscriber_list(&json!({ "document_type": "travel_advice" }))
        .await
        .expect_err("not found");

    check!(err.is_not_found());
}

#[tokio::test]
async fn find_or_create_returns_existing_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscriber-lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(subscriber_list()))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/subscriber-lists"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = api(&mock_server)
        .find_or_create_subscriber_list(&json!({ "links": { "countries": ["uuid-1"] } }))
        .await
        .expect("found");

    check!(response.status() == 200);
}

#[tokio::test]
async fn find_or_create_creates_once_when_missing() {
    let mock_server = MockServer::start().await;
    let attributes = json!({
        "title": "Travel advice",
        "links": { "countries": ["uuid-1"] }
    });

    Mock::given(method("GET"))
        .and(path("/subscriber-lists"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/subscriber-lists"))
        .and(body_json(&attributes))
        .respond_with(ResponseTemplate::new(201).set_body_json(subscriber_list()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = api(&mock_server)
        .find_or_create_subscriber_list(&attributes)
        .await
        .expect("created");

    check!(response.status() == 201);
    check!(response["subscriber_list"]["id"] == json!(1));
}

#[tokio::test]
async fn find_or_create_does_not_create_on_other_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscriber-lists"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = api(&mock_server)
        .find_or_create_subscriber_list(&json!({ "document_type": "travel_advice" }))
        .await
        .expect_err("server error");

    check!(err.is_server_error());
}

#[tokio::test]
async fn content_change_forwards_headers() {
    let mock_server = MockServer::start().await;
    let change = json!({ "content_id": "abc", "title": "Changed" });

    Mock::given(method("POST"))
        .and(path("/content-changes"))
        .and(header("Govuk-Request-Id", "req-1"))
        .and(body_json(&change))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = api(&mock_server)
        .create_content_change(&change, &[("Govuk-Request-Id", "req-1")])
        .await
        .expect("accepted");

    check!(response.status() == 202);
}

#[tokio::test]
async fn topic_matches_uses_nested_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/topic-matches.json"))
        .and(query_param("tags[topics][]", "oil-and-gas/licensing"))
        .and(query_param("document_type", "policy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "topics": ["oil-and-gas-licensing"],
            "enabled": ["oil-and-gas-licensing"],
            "disabled": []
        })))
        .mount(&mock_server)
        .await;

    let response = api(&mock_server)
        .topic_matches(&json!({
            "tags": { "topics": ["oil-and-gas/licensing"] },
            "document_type": "policy"
        }))
        .await
        .expect("matches");

    check!(response["enabled"][0] == json!("oil-and-gas-licensing"));
}

#[tokio::test]
async fn unsubscribe_posts_without_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/unsubscribe/my%20uuid"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    api(&mock_server).unsubscribe("my uuid").await.expect("unsubscribed");

    let requests = mock_server.received_requests().await.expect("recording enabled");
    let_assert!([request] = requests.as_slice());
    check!(request.body.is_empty());
}

#[tokio::test]
async fn unsubscribe_subscriber_deletes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/subscribers/42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    api(&mock_server)
        .unsubscribe_subscriber(42)
        .await
        .expect("unsubscribed");
}

#[tokio::test]
async fn subscribe_defaults_to_immediately() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/subscriptions"))
        .and(body_json(json!({
            "subscriber_list_id": 1,
            "address": "test@example.com",
            "frequency": "immediately"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 99 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = api(&mock_server)
        .subscribe(1, "test@example.com", Frequency::default())
        .await
        .expect("subscribed");

    check!(response["id"] == json!(99));
}

#[tokio::test]
async fn subscription_lookups_encode_ids() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscriber-lists/travel%2Fadvice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(subscriber_list()))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/subscriptions/abc/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "subscription": { "id": "def" } })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = api(&mock_server);
    api.get_subscriber_list("travel/advice").await.expect("list");
    let latest = api
        .get_latest_matching_subscription("abc")
        .await
        .expect("latest");

    check!(latest["subscription"]["id"] == json!("def"));
}

#[tokio::test]
async fn get_subscriptions_with_and_without_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscribers/7/subscriptions"))
        .and(query_param("order", "-title"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ordered": true })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/subscribers/7/subscriptions"))
        .and(query_param_is_missing("order"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ordered": false })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = api(&mock_server);
    let ordered = api.get_subscriptions(7, Some("-title")).await.expect("ordered");
    let unordered = api.get_subscriptions(7, None).await.expect("unordered");

    check!(ordered["ordered"] == json!(true));
    check!(unordered["ordered"] == json!(false));
}

#[tokio::test]
async fn change_subscriber_and_subscription() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/subscribers/7"))
        .and(body_json(json!({ "new_address": "new@example.com" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/subscriptions/abc"))
        .and(body_json(json!({ "frequency": "weekly" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = api(&mock_server);
    api.change_subscriber(7, "new@example.com").await.expect("changed");
    api.change_subscription("abc", Frequency::Weekly)
        .await
        .expect("changed");
}

#[tokio::test]
async fn verification_emails_send_expected_bodies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/subscribers/auth-token"))
        .and(body_json(json!({
            "address": "test@example.com",
            "destination": "/email/manage",
            "redirect": null
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/subscriptions/auth-token"))
        .and(body_json(json!({
            "address": "test@example.com",
            "frequency": "daily",
            "topic_id": "travel-advice"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = api(&mock_server);
    api.send_subscriber_verification_email("test@example.com", "/email/manage", None)
        .await
        .expect("sent");
    api.send_subscription_verification_email("test@example.com", Frequency::Daily, "travel-advice")
        .await
        .expect("sent");
}

#[tokio::test]
async fn oidc_round_trip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscribers/oidc"))
        .and(query_param("destination", "/email/manage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nonce": "n-1",
            "auth_uri": "https://auth.example/authorize"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/subscribers/oidc"))
        .and(body_json(json!({
            "code": "c-1",
            "nonce": "n-1",
            "destination": "/email/manage"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "subscriber_id": 3 })))
        .mount(&mock_server)
        .await;

    let api = api(&mock_server);
    let url = api.get_oidc_url("/email/manage").await.expect("url");
    check!(url["nonce"] == json!("n-1"));

    let verified = api
        .verify_oidc_response("c-1", "n-1", "/email/manage")
        .await
        .expect("verified");
    check!(verified["subscriber_id"] == json!(3));
}

#[tokio::test]
async fn messages_emails_and_unpublishing() {
    let mock_server = MockServer::start().await;

    for route in ["/messages", "/emails", "/unpublish-messages"] {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let api = api(&mock_server);
    api.create_message(&json!({ "title": "Hello" }), &[])
        .await
        .expect("message");
    api.create_email(&json!({ "address": "a@example.com", "subject": "s", "body": "b" }))
        .await
        .expect("email");
    api.send_unpublish_message(&json!({ "content_id": "abc" }))
        .await
        .expect("unpublish");
}

#[tokio::test]
async fn dot_segment_ids_are_rejected_before_sending() {
    let mock_server = MockServer::start().await;
    let api = api(&mock_server);

    let_assert!(Err(err) = api.get_subscription("..").await);
    check!(err.is_invalid_argument());
    let_assert!(Err(err) = api.unsubscribe(".").await);
    check!(err.is_invalid_argument());
    let_assert!(Err(err) = api.change_subscription("..", Frequency::Daily).await);
    check!(err.is_invalid_argument());

    let requests = mock_server.received_requests().await.expect("recording enabled");
    check!(requests.is_empty());
}
