//! Integration tests for the request gateway against a mock HTTP server.
//!
//! These verify envelope parsing, rejection classification, and cookie
//! handling without a real backend.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use parlor_api::{ApiClient, GatewayError, LoginOutcome};

fn envelope(code: &str, message: &str, details: serde_json::Value) -> serde_json::Value {
    json!({ "code": code, "message": message, "details": details })
}

#[tokio::test]
async fn test_login_success_parses_profile_and_stores_cookie() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_partial_json(json!({ "email": "a@b.cc" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "PSESSIONID=abc123; Path=/; HttpOnly")
                .set_body_json(envelope(
                    "SUCCESS",
                    "Logged in",
                    json!({ "id": 7, "username": "alice", "email": "a@b.cc" }),
                )),
        )
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    assert!(!api.has_session_cookie());

    let outcome = api.login("a@b.cc", "Password1").await.unwrap();
    match outcome {
        LoginOutcome::Authenticated(user) => {
            assert_eq!(user.username, "alice");
            assert_eq!(user.id.0, 7);
        }
        other => panic!("expected direct login, got {other:?}"),
    }

    assert!(api.has_session_cookie());
}

#[tokio::test]
async fn test_login_branches_on_second_factor_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "LOGIN_NEEDS_2FA",
            "Please enter your 2FA code to complete login",
            json!({ "token": "tok-1", "provider": "totp" }),
        )))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let outcome = api.login("a@b.cc", "Password1").await.unwrap();

    match outcome {
        LoginOutcome::SecondFactorRequired(challenge) => {
            assert_eq!(challenge.token, "tok-1");
            assert_eq!(challenge.provider.as_deref(), Some("totp"));
        }
        other => panic!("expected 2FA branch, got {other:?}"),
    }
    // No session cookie on the 2FA branch.
    assert!(!api.has_session_cookie());
}

#[tokio::test]
async fn test_rejection_carries_code_and_verbatim_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(envelope(
            "BAD_CREDENTIALS",
            "Invalid email or password",
            serde_json::Value::Null,
        )))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let err = api.login("a@b.cc", "wrong").await.unwrap_err();

    match err {
        GatewayError::Rejection {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 401);
            assert_eq!(code, "BAD_CREDENTIALS");
            assert_eq!(message.as_deref(), Some("Invalid email or password"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_is_authenticated_distinguishes_rejection_from_transport() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/is-authenticated"))
        .respond_with(ResponseTemplate::new(401).set_body_json(envelope(
            "UNAUTHORIZED",
            "User not authenticated",
            serde_json::Value::Null,
        )))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    assert!(!api.is_authenticated().await.unwrap());

    // A server that is simply gone is a transport error, not `Ok(false)`.
    let unreachable = ApiClient::new("http://127.0.0.1:1").unwrap();
    assert!(matches!(
        unreachable.is_authenticated().await,
        Err(GatewayError::Http(_))
    ));
}

#[tokio::test]
async fn test_sidebar_decodes_channel_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/chat/sidebar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "SUCCESS",
            "",
            json!([
                {
                    "id": "9a0df1d2-5c59-4f8f-9d0b-52f4bbe7b1aa",
                    "type": "personal",
                    "name": "alice",
                    "status": "online",
                    "unread": 2,
                    "lastMessage": { "content": "see you", "timestamp": "2025-06-01T09:30:00Z" }
                },
                {
                    "id": "c0b1a2d3-e4f5-4a6b-8c7d-9e0f1a2b3c4d",
                    "type": "group",
                    "name": "rustaceans",
                    "members": 14
                }
            ]),
        )))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let channels = api.sidebar().await.unwrap();

    assert_eq!(channels.len(), 2);
    assert_eq!(channels[0].unread, 2);
    assert_eq!(channels[1].members, Some(14));
    assert_eq!(channels[1].unread, 0);
}

#[tokio::test]
async fn test_two_factor_status_reads_message_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/2fa/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "SUCCESS",
            "Enabled",
            serde_json::Value::Null,
        )))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    assert!(api.two_factor_status().await.unwrap());
}
