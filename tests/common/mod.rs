//! In-process request helpers. Each call builds a fresh router and drives a
//! single request through it without binding a port.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub async fn send(req: Request<Body>) -> (StatusCode, Value) {
    let app = icms_api::routes::app();
    let res = app.oneshot(req).await.expect("router is infallible");
    let status = res.status();
    let bytes = res
        .into_body()
        .collect()
        .await
        .expect("body collect")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response is JSON")
    };
    (status, body)
}

pub async fn get(path: &str) -> (StatusCode, Value) {
    send(
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("request"),
    )
    .await
}

pub async fn get_with_cookie(path: &str, cookie: &str) -> (StatusCode, Value) {
    send(
        Request::builder()
            .uri(path)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .expect("request"),
    )
    .await
}

pub async fn post_json(path: &str, body: Value) -> (StatusCode, Value) {
    send(
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
    )
    .await
}

#[allow(dead_code)]
pub async fn put_json(path: &str, body: Value) -> (StatusCode, Value) {
    send(
        Request::builder()
            .method("PUT")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
    )
    .await
}

#[allow(dead_code)]
pub async fn delete(path: &str) -> (StatusCode, Value) {
    send(
        Request::builder()
            .method("DELETE")
            .uri(path)
            .body(Body::empty())
            .expect("request"),
    )
    .await
}

/// True when the test environment has no database configured; the DB-free
/// assertions only hold in that mode.
pub fn no_database() -> bool {
    std::env::var("DATABASE_URL").is_err()
}
