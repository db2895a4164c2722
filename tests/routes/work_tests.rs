use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::common::TestApp;
use crate::{read_json, request};

#[tokio::test]
async fn test_work_catalog_and_links() {
    let app = TestApp::new().await;
    let auth = app.bearer();

    let response = app
        .router()
        .oneshot(request(
            Method::POST,
            "/api/work",
            Some(&auth),
            Some(json!({ "title": "One Piece", "type": "manga", "total_volumes": 109 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let work_id = read_json(response).await["id_work"].as_i64().unwrap();

    let response = app
        .router()
        .oneshot(request(
            Method::POST,
            "/api/collection",
            Some(&auth),
            Some(json!({ "title": "One Piece", "type": "manga" })),
        ))
        .await
        .unwrap();
    let entry_id = read_json(response).await["id"].as_i64().unwrap();

    let response = app
        .router()
        .oneshot(request(
            Method::POST,
            "/api/collection-work",
            Some(&auth),
            Some(json!({ "id_collection": entry_id, "id_work": work_id, "progress_absolute": 1100 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let link_id = read_json(response).await["id"].as_i64().unwrap();

    let response = app
        .router()
        .oneshot(request(
            Method::PUT,
            &format!("/api/collection-work/{}", link_id),
            Some(&auth),
            Some(json!({ "progress_absolute": 1101 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["progress_absolute"], 1101);

    let response = app
        .router()
        .oneshot(request(Method::GET, "/api/collection-work", Some(&auth), None))
        .await
        .unwrap();
    assert_eq!(read_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_work_update_needs_a_field() {
    let app = TestApp::new().await;
    let auth = app.bearer();

    let response = app
        .router()
        .oneshot(request(
            Method::POST,
            "/api/work",
            Some(&auth),
            Some(json!({ "title": "Akira", "type": "film" })),
        ))
        .await
        .unwrap();
    let id = read_json(response).await["id_work"].as_i64().unwrap();

    let response = app
        .router()
        .oneshot(request(Method::PUT, &format!("/api/work/{}", id), Some(&auth), Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await["error"], "At least one field required");
}
