mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn root_lists_the_api_surface() {
    let (status, body) = common::get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"]["endpoints"]["finance"].is_string());
    assert!(body["data"]["version"].is_string());
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (status, _) = common::get("/api/no-such-resource").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_degraded_without_database() {
    if !common::no_database() {
        return;
    }
    let (status, body) = common::get("/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["status"], "degraded");
}

#[tokio::test]
async fn reference_data_falls_back_when_store_is_down() {
    if !common::no_database() {
        return;
    }
    let (status, body) = common::get("/api/reference/departments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert!(!body["data"].as_array().unwrap().is_empty());

    let (status, body) = common::get("/api/reference/positions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
}
