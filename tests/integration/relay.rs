use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;

use weather_relay::server::{build_router, RelayState};
use weather_relay::upstream::{ProviderSettings, WeatherApiClient};

use crate::mock_upstream::{MockUpstream, STALL};

fn relay_for(addr: SocketAddr, timeout: Duration) -> Router {
    let client = WeatherApiClient::new(ProviderSettings {
        base_url: format!("http://{addr}/v1/current.json"),
        api_key: SecretString::new("test-key".into()),
        timeout,
    })
    .unwrap();
    build_router(Arc::new(RelayState::new(Arc::new(client))))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    (status, body.to_vec())
}

fn json(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_london_report_matches_mapping() {
    let (_mock, addr) = MockUpstream::start().await;
    let app = relay_for(addr, Duration::from_secs(2));

    let (status, body) = get(&app, "/weather?city=London").await;
    assert_eq!(status, StatusCode::OK);

    let report = json(&body);
    assert_eq!(report["city"], "London");
    assert_eq!(report["country"], "United Kingdom");
    assert_eq!(report["temperature_c"].as_f64(), Some(11.0));
    assert_eq!(report["feels_like_c"].as_f64(), Some(9.4));
    assert_eq!(report["pressure"].as_f64(), Some(1012.0));
    assert_eq!(report["humidity"].as_u64(), Some(82));
    assert_eq!(report["description"], "Partly Cloudy");
    assert_eq!(report["icon"], "https://cdn.example/icon.png");
    assert!((report["wind_speed_m_s"].as_f64().unwrap() - 5.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_upstream_receives_key_city_and_aqi_flag() {
    let (mock, addr) = MockUpstream::start().await;
    let app = relay_for(addr, Duration::from_secs(2));

    get(&app, "/weather?city=S%C3%A3o%20Paulo").await;

    let received = mock.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].get("key").map(String::as_str), Some("test-key"));
    assert_eq!(received[0].get("q").map(String::as_str), Some("São Paulo"));
    assert_eq!(received[0].get("aqi").map(String::as_str), Some("no"));
}

#[tokio::test]
async fn test_missing_city_never_calls_upstream() {
    let (mock, addr) = MockUpstream::start().await;
    let app = relay_for(addr, Duration::from_secs(2));

    for uri in ["/weather", "/weather?city=", "/weather?city=%20%20", "/weather?town=Paris"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, br#"{"error":"Missing 'city' parameter"}"#, "{uri}");
    }
    assert!(mock.received().is_empty());
}

#[tokio::test]
async fn test_calm_wind_is_zero() {
    let (_mock, addr) = MockUpstream::start().await;
    let app = relay_for(addr, Duration::from_secs(2));

    let (status, body) = get(&app, "/weather?city=Calm").await;
    assert_eq!(status, StatusCode::OK);

    let report = json(&body);
    assert_eq!(report["wind_speed_m_s"].as_f64(), Some(0.0));
    assert_eq!(report["description"], "Sunny");
    assert_eq!(report["icon"], "https:");
    assert!(report["pressure"].is_null());
}

#[tokio::test]
async fn test_partial_payload_yields_nulls() {
    let (_mock, addr) = MockUpstream::start().await;
    let app = relay_for(addr, Duration::from_secs(2));

    let (status, body) = get(&app, "/weather?city=Reykjavik").await;
    assert_eq!(status, StatusCode::OK);

    let report = json(&body);
    assert_eq!(report["city"], "Reykjavik");
    assert!(report["country"].is_null());
    assert!(report["temperature_c"].is_null());
    assert_eq!(report["wind_speed_m_s"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn test_passthrough_fields_keep_upstream_form() {
    let (_mock, addr) = MockUpstream::start().await;
    let app = relay_for(addr, Duration::from_secs(2));

    let (status, body) = get(&app, "/weather?city=Dewpoint").await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(body).unwrap();
    assert!(text.contains(r#""temperature_c":11,"#), "{text}");
    assert!(text.contains(r#""pressure":1012,"#), "{text}");
    assert!(text.contains(r#""humidity":82.0,"#), "{text}");
}

#[tokio::test]
async fn test_null_error_envelope_uses_generic_message() {
    let (_mock, addr) = MockUpstream::start().await;
    let app = relay_for(addr, Duration::from_secs(2));

    let (status, body) = get(&app, "/weather?city=NullError").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json(&body)["error"],
        "HTTP Error: Could not reach weather service. 400"
    );
}

#[tokio::test]
async fn test_unknown_city_surfaces_provider_message() {
    let (_mock, addr) = MockUpstream::start().await;
    let app = relay_for(addr, Duration::from_secs(2));

    let (status, body) = get(&app, "/weather?city=Atlantis").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, br#"{"error":"No matching location found."}"#);
}

#[tokio::test]
async fn test_rejection_without_message_uses_default() {
    let (_mock, addr) = MockUpstream::start().await;
    let app = relay_for(addr, Duration::from_secs(2));

    let (status, body) = get(&app, "/weather?city=Forbidden").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json(&body)["error"], "City not found or invalid API key.");
}

#[tokio::test]
async fn test_non_json_rejection_uses_generic_message() {
    let (_mock, addr) = MockUpstream::start().await;
    let app = relay_for(addr, Duration::from_secs(2));

    let (status, body) = get(&app, "/weather?city=Gateway").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        json(&body)["error"],
        "HTTP Error: Could not reach weather service. 502"
    );
}

#[tokio::test]
async fn test_malformed_success_body_is_internal_error() {
    let (_mock, addr) = MockUpstream::start().await;
    let app = relay_for(addr, Duration::from_secs(2));

    let (status, body) = get(&app, "/weather?city=Broken").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = json(&body)["error"].as_str().unwrap().to_string();
    assert!(message.starts_with("An unexpected error occurred: "), "{message}");
}

#[tokio::test]
async fn test_refused_connection_is_unreachable() {
    // Reserve a port, then release it so nothing is listening there.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let app = relay_for(addr, Duration::from_secs(2));

    let started = Instant::now();
    let (status, body) = get(&app, "/weather?city=London").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, br#"{"error":"Connection error, check network or API URL."}"#);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_stalled_upstream_times_out() {
    let (_mock, addr) = MockUpstream::start().await;
    let app = relay_for(addr, Duration::from_millis(300));

    let started = Instant::now();
    let (status, body) = get(&app, "/weather?city=Stall").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, br#"{"error":"Connection error, check network or API URL."}"#);
    assert!(started.elapsed() < STALL);
}

#[tokio::test]
async fn test_repeated_requests_are_byte_identical() {
    let (mock, addr) = MockUpstream::start().await;
    let app = relay_for(addr, Duration::from_secs(2));

    let first = get(&app, "/weather?city=London").await;
    let second = get(&app, "/weather?city=London").await;
    assert_eq!(first, second);

    let first = get(&app, "/weather?city=Atlantis").await;
    let second = get(&app, "/weather?city=Atlantis").await;
    assert_eq!(first, second);

    assert_eq!(mock.received().len(), 4);
}
