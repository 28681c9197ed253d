//! End to end posting flow against a mock vendor API.

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cheerlights_tweeter::poster::Poster;
use cheerlights_tweeter::template::TemplateRenderer;
use cheerlights_tweeter::twitter::{
    ApiVersion, ConnectionSettings, PostId, PostingClient,
};

fn write_credential_files(dir: &TempDir) {
    std::fs::write(
        dir.path().join("consumer_twitter_credentials.json"),
        r#"{"CONSUMER_KEY": "ck", "CONSUMER_SECRET": "cs"}"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("access_twitter_credentials.json"),
        r#"{"ACCESS_TOKEN": "at", "ACCESS_SECRET": "as"}"#,
    )
    .unwrap();
}

fn settings(dir: &TempDir, server: &MockServer, version: ApiVersion) -> ConnectionSettings {
    let mut settings = ConnectionSettings::new(dir.path());
    settings.api_version = version;
    settings.api_url = server.uri();
    settings
}

async fn mount_v2_identity(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "42", "name": "Cheer Lights", "username": "cheerlights"}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn colour_tweet_via_v2() {
    let dir = TempDir::new().unwrap();
    write_credential_files(&dir);

    let server = MockServer::start().await;
    mount_v2_identity(&server).await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "1001", "text": "@cheerlights red"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PostingClient::new(settings(&dir, &server, ApiVersion::V2));
    let renderer = TemplateRenderer::new(None, serde_json::Map::new()).unwrap();
    let mut poster = Poster::new(client, renderer);

    poster.connect().await.unwrap();
    let id = poster.post_colour(&json!("red"), None).await.unwrap();
    assert_eq!(id, Some(PostId("1001".to_string())));
}

#[tokio::test]
async fn colour_tweet_via_v1() {
    let dir = TempDir::new().unwrap();
    write_credential_files(&dir);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/account/verify_credentials.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_str": "42",
            "name": "Cheer Lights",
            "screen_name": "cheerlights"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1.1/statuses/update.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_str": "1001",
            "text": "@cheerlights red"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PostingClient::new(settings(&dir, &server, ApiVersion::V1));
    let renderer = TemplateRenderer::new(None, serde_json::Map::new()).unwrap();
    let mut poster = Poster::new(client, renderer);

    poster.connect().await.unwrap();
    let id = poster.post_colour(&json!("red"), None).await.unwrap();
    assert_eq!(id, Some(PostId("1001".to_string())));
}

#[tokio::test]
async fn suppress_tweeting_connects_but_never_posts() {
    let dir = TempDir::new().unwrap();
    write_credential_files(&dir);

    let server = MockServer::start().await;
    mount_v2_identity(&server).await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut settings = settings(&dir, &server, ApiVersion::V2);
    settings.suppress_tweeting = true;

    let mut client = PostingClient::new(settings);
    client.connect().await.unwrap();
    assert!(client.is_connected());

    let id = client.post("@cheerlights red").await.unwrap();
    assert_eq!(id, None);
}

#[tokio::test]
async fn suppress_connection_makes_no_network_calls() {
    let dir = TempDir::new().unwrap();
    write_credential_files(&dir);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut settings = settings(&dir, &server, ApiVersion::V2);
    settings.suppress_connection = true;

    let mut client = PostingClient::new(settings);
    client.connect().await.unwrap();
    assert!(!client.is_connected());
    assert_eq!(client.post("@cheerlights red").await.unwrap(), None);
}

#[tokio::test]
async fn both_versions_normalize_listings_identically() {
    let dir = TempDir::new().unwrap();
    write_credential_files(&dir);

    let v1_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/account/verify_credentials.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_str": "42",
            "name": "Cheer Lights",
            "screen_name": "cheerlights"
        })))
        .mount(&v1_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id_str": "2", "text": "@cheerlights blue"},
            {"id_str": "1", "text": "@cheerlights red"}
        ])))
        .mount(&v1_server)
        .await;

    let v2_server = MockServer::start().await;
    mount_v2_identity(&v2_server).await;
    Mock::given(method("GET"))
        .and(path("/2/users/42/tweets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "2", "text": "@cheerlights blue"},
                {"id": "1", "text": "@cheerlights red"}
            ]
        })))
        .mount(&v2_server)
        .await;

    let mut v1_client = PostingClient::new(settings(&dir, &v1_server, ApiVersion::V1));
    v1_client.connect().await.unwrap();
    let from_v1 = v1_client.list_recent(2).await.unwrap();

    let mut v2_client = PostingClient::new(settings(&dir, &v2_server, ApiVersion::V2));
    v2_client.connect().await.unwrap();
    let from_v2 = v2_client.list_recent(2).await.unwrap();

    assert_eq!(from_v1, from_v2);
    assert_eq!(from_v1[0].id, PostId("2".to_string()));
}

#[tokio::test]
async fn disconnect_ends_the_session() {
    let dir = TempDir::new().unwrap();
    write_credential_files(&dir);

    let server = MockServer::start().await;
    mount_v2_identity(&server).await;

    let mut client = PostingClient::new(settings(&dir, &server, ApiVersion::V2));
    client.connect().await.unwrap();
    assert_eq!(client.identity().unwrap().username, "cheerlights");

    client.disconnect();
    assert!(!client.is_connected());
    assert!(client.post("@cheerlights red").await.is_err());
}
