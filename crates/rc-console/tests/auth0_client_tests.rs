//! Auth0 Management API Adapter Tests
//!
//! Tests for:
//! - Management token request and reuse
//! - Client update payload
//! - Client grant update vs. creation
//! - Error status handling

use std::time::Duration;

use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rc_console::app::AppGrant;
use rc_console::idp::{Auth0Client, Auth0Settings};
use rc_console::{App, IdentityProviderSync, PlatformError};

fn settings(server: &MockServer) -> Auth0Settings {
    Auth0Settings {
        base_url: server.uri(),
        client_id: "mgmt-client".to_string(),
        client_secret: "mgmt-secret".to_string(),
        audience: "https://tenant.example.com/api/v2/".to_string(),
        request_timeout: Duration::from_secs(5),
    }
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_json(serde_json::json!({
            "grant_type": "client_credentials",
            "client_id": "mgmt-client",
            "client_secret": "mgmt-secret",
            "audience": "https://tenant.example.com/api/v2/"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "mgmt-token",
            "token_type": "Bearer",
            "expires_in": 86400
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn billing() -> App {
    let mut app = App::new(12, "billing").with_client_id("client-12");
    app.callbacks = vec!["https://billing.example.com/callback".to_string()];
    app.allowed_logout_urls = vec!["https://billing.example.com".to_string()];
    app.web_origins = vec!["https://billing.example.com".to_string()];
    app
}

fn grant() -> AppGrant {
    AppGrant {
        id: 5,
        app_id: 12,
        audience: "https://records.example.com".to_string(),
        scopes: vec!["read:records".to_string(), "write:records".to_string()],
    }
}

#[tokio::test]
async fn test_sync_app_patches_client() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("PATCH"))
        .and(path("/api/v2/clients/client-12"))
        .and(header("authorization", "Bearer mgmt-token"))
        .and(body_json(serde_json::json!({
            "name": "billing",
            "callbacks": ["https://billing.example.com/callback"],
            "allowed_logout_urls": ["https://billing.example.com"],
            "web_origins": ["https://billing.example.com"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"client_id": "client-12"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = Auth0Client::new(settings(&server)).unwrap();
    client.sync_app(&billing()).await.unwrap();
}

#[tokio::test]
async fn test_management_token_is_reused() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("PATCH"))
        .and(path("/api/v2/clients/client-12"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let client = Auth0Client::new(settings(&server)).unwrap();
    client.sync_app(&billing()).await.unwrap();
    client.sync_app(&billing()).await.unwrap();
}

#[tokio::test]
async fn test_existing_grant_is_updated() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/client-grants"))
        .and(query_param("client_id", "client-12"))
        .and(query_param("audience", "https://records.example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"id": "cgr_1"}])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/v2/client-grants/cgr_1"))
        .and(body_json(serde_json::json!({"scope": ["read:records", "write:records"]})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = Auth0Client::new(settings(&server)).unwrap();
    client.sync_app_grant(&billing(), &grant()).await.unwrap();
}

#[tokio::test]
async fn test_missing_grant_is_created() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/v2/client-grants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v2/client-grants"))
        .and(body_json(serde_json::json!({
            "client_id": "client-12",
            "audience": "https://records.example.com",
            "scope": ["read:records", "write:records"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "cgr_2"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = Auth0Client::new(settings(&server)).unwrap();
    client.sync_app_grant(&billing(), &grant()).await.unwrap();
}

#[tokio::test]
async fn test_error_status_becomes_identity_provider_error() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("PATCH"))
        .and(path("/api/v2/clients/client-12"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let client = Auth0Client::new(settings(&server)).unwrap();
    let err = client.sync_app(&billing()).await.unwrap_err();

    match err {
        PlatformError::IdentityProvider { message } => {
            assert!(message.contains("500"));
            assert!(message.contains("upstream unavailable"));
        }
        other => panic!("expected identity provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_token_request_fails_sync() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({"error": "access_denied"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = Auth0Client::new(settings(&server)).unwrap();
    let err = client.sync_app(&billing()).await.unwrap_err();

    assert!(matches!(err, PlatformError::IdentityProvider { .. }));
}

#[tokio::test]
async fn test_app_without_client_id_is_rejected_before_any_call() {
    let server = MockServer::start().await;
    mount_token(&server, 0).await;

    let client = Auth0Client::new(settings(&server)).unwrap();
    let err = client.sync_app(&App::new(3, "no-client")).await.unwrap_err();

    assert!(matches!(err, PlatformError::Validation { .. }));
}
