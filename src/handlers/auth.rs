use axum::{http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::auth;
use crate::error::ApiError;

/// GET /api/auth/whoami - reports the caller's access tier. No valid session
/// cookie is a 401, not an anonymous 200.
pub async fn whoami(headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    match auth::authenticate(&headers) {
        Some(level) => Ok(Json(json!({
            "authenticated": true,
            "accessLevel": level.as_str(),
        }))),
        None => Err(ApiError::unauthorized("No valid session")),
    }
}
