// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::manager::DbError;

/// One field-level validation failure, reported inside a 400 body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn required(field: &str) -> Self {
        Self {
            field: field.to_string(),
            message: format!("{} is required", field),
        }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Handlers return `Result<_, ApiError>`; the `IntoResponse` impl is the
/// single funnel that shapes every failure, so all routes fail identically.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound {
        entity: &'static str,
        id: String,
    },

    // 409 Conflict (unique-constraint violation)
    Conflict(String),

    // 422 Unprocessable Entity (business-rule violation)
    Domain(String),

    // 500 Internal Server Error
    Internal(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound { .. } => 404,
            ApiError::Conflict(_) => 409,
            ApiError::Domain(_) => 422,
            ApiError::Internal(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Domain(_) => "DOMAIN_RULE_VIOLATION",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::Unauthorized(msg) => msg.clone(),
            ApiError::NotFound { entity, id } => format!("{} {} not found", entity, id),
            ApiError::Conflict(msg) => msg.clone(),
            ApiError::Domain(msg) => msg.clone(),
            // The real cause is logged, not shown, outside development.
            ApiError::Internal(_) => "Internal server error".to_string(),
            ApiError::ServiceUnavailable(msg) => msg.clone(),
        }
    }

    /// Convert to JSON response body. Always includes `error`, `code` and
    /// `timestamp`; variant-specific fields ride alongside.
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": self.message(),
            "code": self.error_code(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        match self {
            ApiError::Validation { errors, .. } => {
                body["validationErrors"] = json!(errors);
            }
            ApiError::NotFound { entity, id } => {
                body["entityName"] = json!(entity);
                body["entityId"] = json!(id);
            }
            ApiError::Internal(details) => {
                if crate::config::config().is_development() {
                    body["details"] = json!(details);
                }
            }
            _ => {}
        }

        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        ApiError::Validation {
            message: message.into(),
            errors,
        }
    }

    pub fn missing_fields(errors: Vec<FieldError>) -> Self {
        ApiError::Validation {
            message: "Missing required fields".to_string(),
            errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ApiError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn domain(message: impl Into<String>) -> Self {
        ApiError::Domain(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Substring carried over from the original system: Postgres reports unique
// violations with this phrase, and existing consumers rely on seeing a 409.
const UNIQUE_VIOLATION_MARKER: &str = "duplicate key value violates unique constraint";

/// Classify a raw sqlx error, most specific case first.
fn classify_sqlx(err: &sqlx::Error) -> ApiError {
    match err {
        sqlx::Error::RowNotFound => ApiError::not_found("record", "?"),
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            ApiError::service_unavailable("Database temporarily unavailable")
        }
        other => {
            let msg = other.to_string();
            if msg.contains(UNIQUE_VIOLATION_MARKER) {
                ApiError::conflict("A record with the same unique value already exists")
            } else {
                tracing::error!("database error: {}", msg);
                ApiError::internal(msg)
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        classify_sqlx(&err)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConfigMissing(what) => {
                ApiError::service_unavailable(format!("Database not configured: {} is not set", what))
            }
            DbError::ConnectionError(msg) => {
                tracing::error!("database connection error: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DbError::NotFound(entity, id) => ApiError::NotFound { entity, id },
            DbError::Sqlx(e) => classify_sqlx(&e),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_code_mapping() {
        let cases = [
            (ApiError::missing_fields(vec![]), 400, "VALIDATION_ERROR"),
            (ApiError::unauthorized("no"), 401, "UNAUTHORIZED"),
            (ApiError::not_found("employee", 7), 404, "NOT_FOUND"),
            (ApiError::conflict("dup"), 409, "CONFLICT"),
            (ApiError::domain("bad move"), 422, "DOMAIN_RULE_VIOLATION"),
            (ApiError::internal("boom"), 500, "INTERNAL_ERROR"),
            (ApiError::service_unavailable("db"), 503, "SERVICE_UNAVAILABLE"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.error_code(), code);
        }
    }

    #[test]
    fn body_always_carries_error_code_timestamp() {
        let body = ApiError::domain("travel request already completed").to_json();
        assert_eq!(body["error"], "travel request already completed");
        assert_eq!(body["code"], "DOMAIN_RULE_VIOLATION");
        assert!(body["timestamp"].is_string());
    }

    #[test]
    fn validation_body_lists_field_errors() {
        let err = ApiError::missing_fields(vec![
            FieldError::required("firstName"),
            FieldError::required("email"),
        ]);
        let body = err.to_json();
        let errors = body["validationErrors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "firstName");
        assert_eq!(errors[0]["message"], "firstName is required");
    }

    #[test]
    fn not_found_body_names_entity_and_id() {
        let body = ApiError::not_found("employer", 42).to_json();
        assert_eq!(body["entityName"], "employer");
        assert_eq!(body["entityId"], "42");
        assert_eq!(body["error"], "employer 42 not found");
    }

    #[test]
    fn classification_is_idempotent_in_shape() {
        let a = ApiError::conflict("dup").to_json();
        let b = ApiError::conflict("dup").to_json();
        assert_eq!(a["error"], b["error"]);
        assert_eq!(a["code"], b["code"]);
    }

    #[test]
    fn db_config_missing_maps_to_503() {
        let err: ApiError = DbError::ConfigMissing("DATABASE_URL").into();
        assert_eq!(err.status_code(), 503);
        assert!(err.message().contains("DATABASE_URL"));
    }

    #[test]
    fn unique_violation_substring_maps_to_409() {
        let sqlx_err = sqlx::Error::Protocol(format!(
            "error returned from database: {} \"employees_email_key\"",
            UNIQUE_VIOLATION_MARKER
        ));
        let err: ApiError = sqlx_err.into();
        assert_eq!(err.status_code(), 409);
    }
}
