mod common;

use std::sync::Arc;

use djassist::{
    Error,
    management::{CREDENTIAL_KEY, CredentialManager},
    settings::{MemorySettings, SettingsMap},
    spotify::SpotifyClient,
    types::{CredentialRecord, RecommendationParams},
    utils,
};
use mockito::{Matcher, Server};
use serde_json::json;

use common::{FakeBrowser, Redirect, manager, test_config};

fn signed_in() -> Arc<MemorySettings> {
    let record = CredentialRecord {
        client_id: "test-client".to_string(),
        access_token: "access-1".to_string(),
        access_expires_at: utils::now_millis() + 600_000,
        refresh_token_enc: None,
    };
    let mut map = SettingsMap::new();
    map.insert(
        CREDENTIAL_KEY.to_string(),
        serde_json::to_value(record).unwrap(),
    );
    Arc::new(MemorySettings::with(map))
}

fn credentials(settings: Arc<MemorySettings>) -> Arc<CredentialManager> {
    Arc::new(manager(
        settings,
        FakeBrowser::new(Redirect::Ignore),
        test_config("http://127.0.0.1:9"),
    ))
}

fn track_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "duration_ms": 215000,
        "popularity": 71,
        "uri": format!("spotify:track:{}", id),
        "artists": [{ "id": "a1", "name": "Daft Punk" }],
        "album": { "id": "al1", "name": "Discovery", "release_date": "2001-03-12" }
    })
}

#[tokio::test]
async fn test_search_tracks_sends_bearer_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/search")
        .match_header("authorization", "Bearer access-1")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "one more time".into()),
            Matcher::UrlEncoded("type".into(), "track".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "tracks": {
                    "items": [track_json("t1", "One More Time"), track_json("t2", "Aerodynamic")],
                    "total": 2
                }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = SpotifyClient::new(&format!("{}/v1", server.url()), credentials(signed_in()));
    let tracks = client.search_tracks("one more time", None).await.unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].name, "One More Time");
    assert_eq!(tracks[1].id.as_deref(), Some("t2"));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_without_results() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"tracks":{"items":[]}}"#)
        .create_async()
        .await;

    let client = SpotifyClient::new(&format!("{}/v1", server.url()), credentials(signed_in()));
    assert!(client.search_tracks("zzzz", Some(5)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_track_by_id() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/tracks/t1")
        .match_header("authorization", "Bearer access-1")
        .with_status(200)
        .with_body(track_json("t1", "One More Time").to_string())
        .create_async()
        .await;

    let client = SpotifyClient::new(&format!("{}/v1/", server.url()), credentials(signed_in()));
    let track = client.track("t1").await.unwrap();

    assert_eq!(track.name, "One More Time");
    assert_eq!(track.artists[0].name, "Daft Punk");
    assert_eq!(track.duration_ms, 215000);
}

#[tokio::test]
async fn test_audio_features_skips_unknown_tracks() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/audio-features")
        .match_query(Matcher::UrlEncoded("ids".into(), "t1,missing".into()))
        .with_status(200)
        .with_body(
            json!({
                "audio_features": [
                    {
                        "id": "t1",
                        "tempo": 122.75,
                        "key": 2,
                        "mode": 1,
                        "energy": 0.69,
                        "danceability": 0.61,
                        "valence": 0.47
                    },
                    null
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = SpotifyClient::new(&format!("{}/v1", server.url()), credentials(signed_in()));
    let features = client
        .audio_features(&["t1".to_string(), "missing".to_string()])
        .await
        .unwrap();

    assert_eq!(features.len(), 1);
    assert_eq!(features[0].id, "t1");
    assert_eq!(features[0].key, 2);
    assert!((features[0].tempo - 122.75).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_audio_features_for_no_ids_skips_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = SpotifyClient::new(&format!("{}/v1", server.url()), credentials(signed_in()));
    assert!(client.audio_features(&[]).await.unwrap().is_empty());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_recommendations_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/recommendations")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("seed_tracks".into(), "t1,t2".into()),
            Matcher::UrlEncoded("seed_genres".into(), "house".into()),
            Matcher::UrlEncoded("target_tempo".into(), "124".into()),
            Matcher::UrlEncoded("min_energy".into(), "0.6".into()),
            Matcher::UrlEncoded("limit".into(), "20".into()),
        ]))
        .with_status(200)
        .with_body(json!({ "tracks": [track_json("t3", "Digital Love")] }).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = SpotifyClient::new(&format!("{}/v1", server.url()), credentials(signed_in()));
    let params = RecommendationParams {
        seed_tracks: vec!["t1".to_string(), "t2".to_string()],
        seed_genres: vec!["house".to_string()],
        target_tempo: Some(124.0),
        min_energy: Some(0.6),
        ..Default::default()
    };
    let tracks = client.recommendations(&params).await.unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].name, "Digital Love");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_api_error_carries_status_and_body() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v1/tracks/nope")
        .with_status(404)
        .with_body(r#"{"error":{"status":404,"message":"Not found."}}"#)
        .create_async()
        .await;

    let client = SpotifyClient::new(&format!("{}/v1", server.url()), credentials(signed_in()));
    match client.track("nope").await {
        Err(Error::Api { status, body }) => {
            assert_eq!(status, 404);
            assert!(body.contains("Not found."));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_unauthorized_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/tracks/t1")
        .with_status(401)
        .with_body(r#"{"error":{"status":401,"message":"The access token expired"}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = SpotifyClient::new(&format!("{}/v1", server.url()), credentials(signed_in()));
    assert!(matches!(
        client.track("t1").await,
        Err(Error::Api { status: 401, .. })
    ));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_signed_out_client_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = SpotifyClient::new(
        &format!("{}/v1", server.url()),
        credentials(Arc::new(MemorySettings::new())),
    );
    assert!(matches!(
        client.search_tracks("anything", None).await,
        Err(Error::NotAuthenticated)
    ));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_api_is_a_transport_error() {
    // bind and release a port so nothing is listening on it
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let client = SpotifyClient::new(
        &format!("http://127.0.0.1:{}/v1", port),
        credentials(signed_in()),
    );
    match client.track("t1").await {
        Err(Error::Http(e)) => assert!(e.is_connect()),
        other => panic!("unexpected outcome: {:?}", other),
    }
}
