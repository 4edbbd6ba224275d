//! V2 employee surface: DTO-mapped, wrapped envelope `{ success, data, count }`.

use axum::{
    extract::{Path, Query},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::QueryBuilder;

use crate::db::Database;
use crate::domain::employee::Employee;
use crate::dto::employee::{to_detailed_response_dto, to_list_response_dto, to_response_dto};
use crate::error::ApiError;
use crate::validate::parse_id;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<String>,
    pub department: Option<String>,
    pub include_stats: Option<bool>,
}

/// GET /api/v2/employees
pub async fn list(Query(query): Query<ListQuery>) -> Result<Json<Value>, ApiError> {
    let pool = Database::pool().await?;

    let mut qb = QueryBuilder::new("SELECT * FROM employees WHERE 1=1");
    if let Some(status) = &query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(department) = &query.department {
        qb.push(" AND department = ").push_bind(department);
    }
    qb.push(" ORDER BY id");

    let rows: Vec<Employee> = qb.build_query_as().fetch_all(&pool).await?;
    let list = to_list_response_dto(&rows, query.include_stats.unwrap_or(false));
    let count = list.total;

    Ok(Json(json!({
        "success": true,
        "data": list,
        "count": count,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ShowQuery {
    pub detailed: Option<bool>,
}

/// GET /api/v2/employees/:id - `?detailed=true` adds the address group and
/// sensitive fields
pub async fn get(
    Path(id): Path<String>,
    Query(query): Query<ShowQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;

    let row: Employee = sqlx::query_as("SELECT * FROM employees WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("employee", id))?;

    let data = if query.detailed.unwrap_or(false) {
        serde_json::to_value(to_detailed_response_dto(&row))
            .map_err(|e| ApiError::internal(e.to_string()))?
    } else {
        serde_json::to_value(to_response_dto(&row))
            .map_err(|e| ApiError::internal(e.to_string()))?
    };

    Ok(Json(json!({ "success": true, "data": data })))
}
