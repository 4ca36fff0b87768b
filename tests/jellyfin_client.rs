//! Integration tests for the Jellyfin session client.

use jellypot::jellyfin::{
  ticks_to_seconds, ClientIdentity, Credentials, JellyfinClient, JellyfinError, PlaybackProgress,
  PLAY_METHOD_DIRECT,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UNAUTHED_HEADER: &str =
  r#"MediaBrowser Client="JellyPot", Device="PotPlayer", DeviceId="jellypot-test", Version="1.0.0""#;
const AUTHED_HEADER: &str = r#"MediaBrowser Token="tok-abc", Client="JellyPot", Device="PotPlayer", DeviceId="jellypot-test", Version="1.0.0""#;

fn test_client(server_url: &str) -> JellyfinClient {
  let credentials = Credentials {
    username: "alice".to_string(),
    password: "secret".to_string(),
  };
  let identity = ClientIdentity {
    client: "JellyPot".to_string(),
    device: "PotPlayer".to_string(),
    device_id: "jellypot-test".to_string(),
    version: "1.0.0".to_string(),
  };
  JellyfinClient::new(server_url, credentials, identity).unwrap()
}

fn auth_response() -> serde_json::Value {
  json!({
    "AccessToken": "tok-abc",
    "SessionInfo": { "Id": "sess-1", "UserId": "user-1" }
  })
}

fn progress(item_id: &str) -> PlaybackProgress {
  PlaybackProgress {
    position_ticks: 50_000_000,
    playback_start_time_ticks: 1,
    play_method: PLAY_METHOD_DIRECT.to_string(),
    media_source_id: item_id.to_string(),
    can_seek: true,
    item_id: item_id.to_string(),
    event_name: "timeupdate".to_string(),
  }
}

#[tokio::test]
async fn test_authenticate_stores_session() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/Users/AuthenticateByName"))
    .and(header("authorization", UNAUTHED_HEADER))
    .and(body_partial_json(json!({"Username": "alice", "Pw": "secret"})))
    .respond_with(ResponseTemplate::new(200).set_body_json(auth_response()))
    .expect(1)
    .mount(&server)
    .await;

  let client = test_client(&server.uri());
  assert!(!client.is_authenticated());

  client.authenticate().await.unwrap();

  assert!(client.is_authenticated());
  assert_eq!(client.session_id().as_deref(), Some("sess-1"));
  assert_eq!(client.user_id().unwrap(), "user-1");
}

#[tokio::test]
async fn test_authenticate_surfaces_http_failure() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/Users/AuthenticateByName"))
    .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
    .mount(&server)
    .await;

  let client = test_client(&server.uri());
  let err = client.authenticate().await.unwrap_err();

  assert!(matches!(err, JellyfinError::AuthFailed(_)));
  assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_authenticate_rejects_empty_token() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/Users/AuthenticateByName"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "AccessToken": "",
      "SessionInfo": { "Id": "sess-1", "UserId": "user-1" }
    })))
    .mount(&server)
    .await;

  let client = test_client(&server.uri());
  let err = client.authenticate().await.unwrap_err();

  assert!(err.to_string().contains("empty access token"));
  assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_get_item_parses_resume_position() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/Users/AuthenticateByName"))
    .respond_with(ResponseTemplate::new(200).set_body_json(auth_response()))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/Users/user-1/Items/ABC123"))
    .and(header("authorization", AUTHED_HEADER))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "Id": "ABC123",
      "Name": "Example Movie",
      "Type": "Movie",
      "UserData": { "PlaybackPositionTicks": 1_200_000_000i64, "ItemId": "ABC123" }
    })))
    .mount(&server)
    .await;

  let client = test_client(&server.uri());
  client.authenticate().await.unwrap();
  let item = client.get_item("ABC123").await.unwrap();

  assert_eq!(item.name, "Example Movie");
  assert_eq!(item.item_type, "Movie");
  assert_eq!(item.user_data.playback_position_ticks, 1_200_000_000);
  assert_eq!(ticks_to_seconds(item.user_data.playback_position_ticks), 120);
}

#[tokio::test]
async fn test_get_item_requires_authentication() {
  let server = MockServer::start().await;

  let client = test_client(&server.uri());
  let err = client.get_item("ABC123").await.unwrap_err();

  assert!(matches!(err, JellyfinError::NotAuthenticated));
  assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_item_lookup_failure_keeps_session() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/Users/AuthenticateByName"))
    .respond_with(ResponseTemplate::new(200).set_body_json(auth_response()))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/Users/user-1/Items/MISSING"))
    .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
    .mount(&server)
    .await;

  let client = test_client(&server.uri());
  client.authenticate().await.unwrap();
  let err = client.get_item("MISSING").await.unwrap_err();

  assert!(matches!(err, JellyfinError::ItemLookup(_)));
  assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_get_item_malformed_body_clears_session() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/Users/AuthenticateByName"))
    .respond_with(ResponseTemplate::new(200).set_body_json(auth_response()))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/Users/user-1/Items/ABC123"))
    .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
    .mount(&server)
    .await;

  let client = test_client(&server.uri());
  client.authenticate().await.unwrap();
  let err = client.get_item("ABC123").await.unwrap_err();

  assert!(matches!(err, JellyfinError::ItemLookup(_)));
  assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_report_progress_authenticates_once() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/Users/AuthenticateByName"))
    .respond_with(ResponseTemplate::new(200).set_body_json(auth_response()))
    .expect(1)
    .mount(&server)
    .await;
  Mock::given(method("POST"))
    .and(path("/Sessions/Playing/Progress"))
    .and(header("authorization", AUTHED_HEADER))
    .and(body_partial_json(json!({
      "PositionTicks": 50_000_000i64,
      "PlayMethod": "DirectPlay",
      "MediaSourceId": "ABC123",
      "CanSeek": true,
      "ItemId": "ABC123",
      "EventName": "timeupdate"
    })))
    .respond_with(ResponseTemplate::new(204))
    .expect(2)
    .mount(&server)
    .await;

  let client = test_client(&server.uri());
  client.report_progress(&progress("ABC123")).await.unwrap();
  client.report_progress(&progress("ABC123")).await.unwrap();

  assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_report_failure_clears_token_and_recovers() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/Users/AuthenticateByName"))
    .respond_with(ResponseTemplate::new(200).set_body_json(auth_response()))
    .expect(2)
    .mount(&server)
    .await;
  Mock::given(method("POST"))
    .and(path("/Sessions/Playing/Progress"))
    .respond_with(ResponseTemplate::new(500))
    .up_to_n_times(1)
    .mount(&server)
    .await;
  Mock::given(method("POST"))
    .and(path("/Sessions/Playing/Progress"))
    .respond_with(ResponseTemplate::new(204))
    .mount(&server)
    .await;

  let client = test_client(&server.uri());
  let err = client.report_progress(&progress("ABC123")).await.unwrap_err();

  assert!(matches!(err, JellyfinError::ReportFailed(_)));
  assert!(!client.is_authenticated());

  // The next report signs in again before posting.
  client.report_progress(&progress("ABC123")).await.unwrap();
  assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_download_url_embeds_token() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/Users/AuthenticateByName"))
    .respond_with(ResponseTemplate::new(200).set_body_json(auth_response()))
    .mount(&server)
    .await;

  let client = test_client(&server.uri());
  assert!(matches!(
    client.download_url("ABC123"),
    Err(JellyfinError::NotAuthenticated)
  ));

  client.authenticate().await.unwrap();
  let url = client.download_url("ABC123").unwrap();
  assert_eq!(
    url,
    format!("{}/Items/ABC123/Download?api_key=tok-abc", server.uri())
  );
}
