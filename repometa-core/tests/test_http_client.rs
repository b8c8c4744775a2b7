//! Integration tests for ReqwestHttpClient using wiremock

use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use repometa_core::config::HttpConfig;
use repometa_core::domain::Credentials;
use repometa_core::infrastructure::{HttpClient, HttpRequest, ReqwestHttpClient, TransportError};

fn client() -> ReqwestHttpClient {
    ReqwestHttpClient::new(&HttpConfig::default()).expect("client should build")
}

#[tokio::test]
async fn test_returns_status_headers_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/package/demo"))
        .and(header("Accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Registry", "stub")
                .set_body_string(r#"{"ok":true}"#),
        )
        .mount(&mock_server)
        .await;

    let request = HttpRequest::get(
        format!("{}/package/demo", mock_server.uri()),
        Duration::from_secs(5),
    )
    .with_header("Accept", "application/json");

    let response = client().execute(request).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.header("x-registry"), Some("stub"));
    assert_eq!(response.text(), r#"{"ok":true}"#);
}

#[tokio::test]
async fn test_non_success_status_is_not_a_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let request = HttpRequest::get(format!("{}/missing", mock_server.uri()), Duration::from_secs(5));
    let response = client().execute(request).await.unwrap();

    assert_eq!(response.status, 404);
    assert!(!response.is_success());
}

#[tokio::test]
async fn test_basic_credentials_are_sent() {
    let mock_server = MockServer::start().await;

    // base64("ci:s3cr3t")
    Mock::given(method("GET"))
        .and(header("Authorization", "Basic Y2k6czNjcjN0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = HttpRequest::get(mock_server.uri(), Duration::from_secs(5))
        .with_credentials(Some(Credentials::basic("ci", "s3cr3t")));
    let response = client().execute(request).await.unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_bearer_credentials_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = HttpRequest::get(mock_server.uri(), Duration::from_secs(5))
        .with_credentials(Some(Credentials::bearer("token-123")));
    let response = client().execute(request).await.unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_slow_response_maps_to_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let request = HttpRequest::get(mock_server.uri(), Duration::from_millis(100));
    let err = client().execute(request).await.unwrap_err();

    assert_eq!(err, TransportError::Timeout);
}

#[tokio::test]
async fn test_closed_port_maps_to_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let request = HttpRequest::get(format!("http://{}/", address), Duration::from_secs(2));
    let err = client().execute(request).await.unwrap_err();

    assert!(matches!(err, TransportError::Unreachable(_)));
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/huge"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(4096)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/small"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let client = ReqwestHttpClient::new(&HttpConfig {
        max_response_bytes: 1024,
        ..HttpConfig::default()
    })
    .expect("client should build");

    let err = client
        .execute(HttpRequest::get(
            format!("{}/huge", mock_server.uri()),
            Duration::from_secs(5),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, TransportError::BodyTooLarge { limit: 1024 });

    let response = client
        .execute(HttpRequest::get(
            format!("{}/small", mock_server.uri()),
            Duration::from_secs(5),
        ))
        .await
        .unwrap();
    assert_eq!(response.body, b"ok");
}
