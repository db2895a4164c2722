use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::common::TestApp;
use crate::{read_json, request};

#[tokio::test]
async fn test_list_requires_a_token() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(request(Method::GET, "/api/collection", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(read_json(response).await["error"].is_string());

    let response = app
        .router()
        .oneshot(request(Method::GET, "/api/collection", Some("Bearer nope"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_then_list() {
    let app = TestApp::new().await;
    let auth = app.bearer();

    // Create two entries
    for (title, kind) in [("Naruto", "anime"), ("Frieren", "simulcast")] {
        let response = app
            .router()
            .oneshot(request(
                Method::POST,
                "/api/collection",
                Some(&auth),
                Some(json!({ "title": title, "type": kind })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = read_json(response).await;
        assert_eq!(body["title"], title);
        assert_eq!(body["progress"], 0);
    }

    // Newest first
    let response = app
        .router()
        .oneshot(request(Method::GET, "/api/collection", Some(&auth), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Frieren", "Naruto"]);
}

#[tokio::test]
async fn test_get_update_delete_by_id() {
    let app = TestApp::new().await;
    let auth = app.bearer();

    let response = app
        .router()
        .oneshot(request(
            Method::POST,
            "/api/collection",
            Some(&auth),
            Some(json!({ "title": "Dandadan", "type": "simulcast", "dateSimulcast": "2024-10-03" })),
        ))
        .await
        .unwrap();
    let id = read_json(response).await["id"].as_i64().unwrap();
    let uri = format!("/api/collection/{}", id);

    let response = app
        .router()
        .oneshot(request(Method::GET, &uri, Some(&auth), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["dateSimulcast"], "2024-10-03");

    let response = app
        .router()
        .oneshot(request(Method::PUT, &uri, Some(&auth), Some(json!({ "progress": 12 }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["progress"], 12);
    assert_eq!(body["title"], "Dandadan");

    let response = app
        .router()
        .oneshot(request(Method::DELETE, &uri, Some(&auth), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .router()
        .oneshot(request(Method::GET, &uri, Some(&auth), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["error"], format!("Collection entry {} not found", id));
}

#[tokio::test]
async fn test_missing_and_malformed_ids_are_404() {
    let app = TestApp::new().await;
    let auth = app.bearer();

    for uri in ["/api/collection/4242", "/api/collection/abc"] {
        let response = app
            .router()
            .oneshot(request(Method::DELETE, uri, Some(&auth), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert!(read_json(response).await["error"].is_string());
    }
}

#[tokio::test]
async fn test_invalid_payloads_are_500_with_message() {
    let app = TestApp::new().await;
    let auth = app.bearer();

    let response = app
        .router()
        .oneshot(request(
            Method::POST,
            "/api/collection",
            Some(&auth),
            Some(json!({ "title": "  ", "type": "anime" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await["error"], "Title must not be empty");

    let response = app
        .router()
        .oneshot(request(
            Method::POST,
            "/api/collection",
            Some(&auth),
            Some(json!({ "title": "Ghost", "type": "podcast" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unsupported_method_is_405() {
    let app = TestApp::new().await;

    let response = app
        .router()
        .oneshot(request(Method::PATCH, "/api/collection", Some(&app.bearer()), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
