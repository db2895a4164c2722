use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::common::TestApp;
use crate::{read_json, request};

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(request(Method::GET, "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_with_api_key() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "owner@localhost", "password": app.token })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["access_token"], app.token.as_str());

    let response = app
        .router()
        .oneshot(request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "owner@localhost", "password": "guess" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(response).await["error"], "Invalid login credentials");
}

#[tokio::test]
async fn test_current_user_and_logout() {
    let app = TestApp::new().await;
    let auth = app.bearer();

    let response = app
        .router()
        .oneshot(request(Method::GET, "/api/auth/user", Some(&auth), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["id"], "00000000-0000-0000-0000-000000000000");

    let response = app
        .router()
        .oneshot(request(Method::POST, "/api/auth/logout", Some(&auth), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_hosted_only_flows_are_501_locally() {
    let app = TestApp::new().await;

    let calls = [
        ("/api/auth/signup", json!({ "email": "a@b.c", "password": "secret123" })),
        ("/api/auth/magic-link", json!({ "email": "a@b.c" })),
        ("/api/auth/recover", json!({ "email": "a@b.c" })),
    ];
    for (uri, body) in calls {
        let response = app
            .router()
            .oneshot(request(Method::POST, uri, None, Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED, "{}", uri);
    }

    let response = app
        .router()
        .oneshot(request(
            Method::PUT,
            "/api/auth/password",
            Some(&app.bearer()),
            Some(json!({ "password": "new-secret" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn test_malformed_login_body() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(request(Method::POST, "/api/auth/login", None, Some(json!({ "email": 3 }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(read_json(response).await["error"].is_string());
}
