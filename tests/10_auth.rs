mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn whoami_without_cookie_is_401() {
    let (status, body) = common::get("/api/auth/whoami").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn whoami_with_forged_cookie_is_401() {
    let forged = "icms_admin_session=eyJhbGciOiJIUzI1NiJ9.e30.invalid";
    let (status, body) = common::get_with_cookie("/api/auth/whoami", forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn unrelated_cookies_do_not_authenticate() {
    let (status, _) = common::get_with_cookie("/api/auth/whoami", "theme=dark; lang=en").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
