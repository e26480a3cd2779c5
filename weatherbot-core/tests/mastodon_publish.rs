use httpmock::prelude::*;
use serde_json::json;
use weatherbot_core::{
    BotError, MastodonClient, StatusPublisher, publisher::mastodon::Visibility,
};

#[tokio::test]
async fn posts_status_with_bearer_token() {
    let server = MockServer::start_async().await;
    let post_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/statuses")
                .header("authorization", "Bearer TOKEN")
                .body_contains("status=Sunny")
                .body_contains("visibility=unlisted");
            then.status(200).json_body(json!({
                "id": "110",
                "url": "https://mastodon.example/@weather/110",
                "content": "<p>Sunny</p>"
            }));
        })
        .await;

    let client =
        MastodonClient::new(&server.base_url(), "TOKEN".into()).with_visibility(Visibility::Unlisted);
    let published = client.publish("Sunny, 20°C").await.unwrap();

    post_mock.assert_async().await;
    assert_eq!(published.id, "110");
    assert_eq!(published.url.as_deref(), Some("https://mastodon.example/@weather/110"));
}

#[tokio::test]
async fn rejected_post_is_a_publish_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/statuses");
            then.status(422)
                .json_body(json!({"error": "Validation failed: Text character limit of 500 exceeded"}));
        })
        .await;

    let client = MastodonClient::new(&server.base_url(), "TOKEN".into());
    let err = client.publish("too long").await.unwrap_err();

    assert!(matches!(err, BotError::Publish(_)));
    assert!(err.to_string().contains("422"));
}

#[tokio::test]
async fn verifies_credentials() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/accounts/verify_credentials")
                .header("authorization", "Bearer TOKEN");
            then.status(200)
                .json_body(json!({"id": "1", "acct": "weather", "display_name": "Weather Bot"}));
        })
        .await;

    let client = MastodonClient::new(&server.base_url(), "TOKEN".into());
    let account = client.verify_credentials().await.unwrap();

    assert_eq!(account.acct, "weather");
    assert_eq!(account.display_name, "Weather Bot");
}

#[tokio::test]
async fn bad_token_fails_credential_check() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/accounts/verify_credentials");
            then.status(401).json_body(json!({"error": "The access token is invalid"}));
        })
        .await;

    let client = MastodonClient::new(&server.base_url(), "WRONG".into());
    let err = client.verify_credentials().await.unwrap_err();

    assert!(err.to_string().contains("401"));
}
