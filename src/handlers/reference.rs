//! Reference lookups backed by the two-tier read in [`crate::db::fallback`].
//! The response marks which tier answered so callers can tell cached defaults
//! from live data.

use axum::Json;
use serde_json::{json, Value};

use crate::db::fallback::{self, FALLBACK_DEPARTMENTS, FALLBACK_POSITIONS};
use crate::error::ApiError;

/// GET /api/reference/departments
pub async fn departments() -> Result<Json<Value>, ApiError> {
    let (names, source) = fallback::read_reference("departments", FALLBACK_DEPARTMENTS).await?;
    Ok(Json(json!({ "source": source, "data": names })))
}

/// GET /api/reference/positions
pub async fn positions() -> Result<Json<Value>, ApiError> {
    let (names, source) = fallback::read_reference("positions", FALLBACK_POSITIONS).await?;
    Ok(Json(json!({ "source": source, "data": names })))
}
