//! Integration tests for the banking HTTP client

use mobank_core::LoginCredentials;
use mobank_http::client::{ClientError, PublicBankingClient, TypedClientBuilder};
use mobank_http::types::{RefreshRequest, RegisterRequest};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_json() -> serde_json::Value {
    json!({
        "id": "u-1",
        "name": "Ama Mensah",
        "phoneNumber": "0592063360",
        "balance": "250.50",
        "createdAt": "2024-05-01T10:00:00Z"
    })
}

#[tokio::test]
async fn test_client_builder() {
    let client = TypedClientBuilder::new()
        .base_url("http://localhost:8080/api/")
        .timeout(Duration::from_secs(15))
        .build_public();

    assert!(client.is_ok());
    let client = client.unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080/api");
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = TypedClientBuilder::new().build_public();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_login_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "phoneNumber": "0592063360", "pin": "1234" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "access-1",
            "user": user_json(),
            "expiresAt": "2024-05-01T11:00:00Z"
        })))
        .mount(&mock_server)
        .await;

    let client = PublicBankingClient::new(mock_server.uri()).unwrap();
    let response = client
        .login(&LoginCredentials::new("0592063360", "1234"))
        .await
        .unwrap();

    assert_eq!(response.token, "access-1");
    assert_eq!(response.user.name, "Ama Mensah");
    assert_eq!(response.refresh_token, None);
}

#[tokio::test]
async fn test_register_unwraps_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(json!({ "name": "Ama Mensah", "phoneNumber": "0592063360", "pin": "1234" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "token": "access-1", "user": user_json(), "refreshToken": "refresh-1" },
            "message": "Registered",
            "status": 201
        })))
        .mount(&mock_server)
        .await;

    let client = PublicBankingClient::new(mock_server.uri()).unwrap();
    let request = RegisterRequest {
        name: "Ama Mensah".to_string(),
        phone_number: "0592063360".to_string(),
        pin: "1234".to_string(),
    };

    let response = client.register(&request).await.unwrap();
    assert_eq!(response.refresh_token.as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn test_refresh_sends_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(header("authorization", "Bearer access-1"))
        .and(body_json(json!({ "refreshToken": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "access-2",
            "user": user_json()
        })))
        .mount(&mock_server)
        .await;

    let client = PublicBankingClient::new(mock_server.uri())
        .unwrap()
        .with_token("access-1");
    let response = client
        .refresh(&RefreshRequest {
            refresh_token: Some("refresh-1".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(response.token, "access-2");
}

#[tokio::test]
async fn test_logout_ignores_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = TypedClientBuilder::new()
        .base_url(mock_server.uri())
        .build_authenticated("access-1")
        .unwrap();

    assert!(client.logout().await.is_ok());
}

#[tokio::test]
async fn test_profile_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wallet/profile"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&mock_server)
        .await;

    let client = PublicBankingClient::new(mock_server.uri())
        .unwrap()
        .with_token("access-1");
    let profile = client.profile().await.unwrap();

    assert_eq!(profile.id, "u-1");
    assert_eq!(profile.balance.to_string(), "250.50");
}

#[tokio::test]
async fn test_error_handling() {
    let mock_server = MockServer::start().await;

    // Test 401 Unauthorized
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": 401,
            "error": "Unauthorized",
            "message": "Invalid credentials",
            "path": "/api/auth/login"
        })))
        .mount(&mock_server)
        .await;

    let client = PublicBankingClient::new(mock_server.uri()).unwrap();
    let result = client
        .login(&LoginCredentials::new("0592063360", "9999"))
        .await;

    match result {
        Err(ClientError::AuthenticationFailed(message)) => {
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_text_error_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wallet/profile"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Database unavailable"))
        .mount(&mock_server)
        .await;

    let client = PublicBankingClient::new(mock_server.uri())
        .unwrap()
        .with_token("access-1");
    let result = client.profile().await;

    assert!(matches!(
        result,
        Err(ClientError::ServerError { status: 500, ref message }) if message == "Database unavailable"
    ));
}

#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wallet/profile"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_json())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = TypedClientBuilder::new()
        .base_url(mock_server.uri())
        .timeout(Duration::from_millis(50))
        .build_authenticated("access-1")
        .unwrap();

    let error = client.profile().await.unwrap_err();
    assert!(error.is_timeout());
    assert_eq!(error.status(), None);
}
