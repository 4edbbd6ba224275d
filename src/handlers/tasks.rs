use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::QueryBuilder;

use crate::db::Database;
use crate::domain::schedule::{DailyTask, TaskStatus};
use crate::error::{ApiError, FieldError};
use crate::validate::{opt_str, parse_id, parse_optional_date, require_fields, str_or_default};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

/// GET /api/tasks - bare array, optional status/category/priority filters
pub async fn list(Query(query): Query<ListQuery>) -> Result<Json<Vec<DailyTask>>, ApiError> {
    let pool = Database::pool().await?;

    let mut qb = QueryBuilder::new("SELECT * FROM daily_tasks WHERE 1=1");
    if let Some(status) = &query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(category) = &query.category {
        qb.push(" AND category = ").push_bind(category);
    }
    if let Some(priority) = &query.priority {
        qb.push(" AND priority = ").push_bind(priority);
    }
    qb.push(" ORDER BY due_date NULLS LAST, id");

    let rows: Vec<DailyTask> = qb.build_query_as().fetch_all(&pool).await?;
    Ok(Json(rows))
}

/// GET /api/tasks/:id
pub async fn get(Path(id): Path<String>) -> Result<Json<DailyTask>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;

    let row: Option<DailyTask> = sqlx::query_as("SELECT * FROM daily_tasks WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;
    row.map(Json).ok_or_else(|| ApiError::not_found("task", id))
}

fn validated_status(body: &Value, default: &str) -> Result<String, ApiError> {
    let status = str_or_default(body, "status", default);
    status.parse::<TaskStatus>().map_err(|msg| {
        ApiError::validation("Invalid status", vec![FieldError::invalid("status", msg)])
    })?;
    Ok(status)
}

/// POST /api/tasks - only a title is required
pub async fn create(Json(body): Json<Value>) -> Result<Response, ApiError> {
    require_fields(&body, &["title"])?;

    let due_date = parse_optional_date(&body, "dueDate")?;
    let status = validated_status(&body, "PENDING")?;

    let pool = Database::pool().await?;
    let row: DailyTask = sqlx::query_as(
        "INSERT INTO daily_tasks (title, description, due_date, priority, category, status)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(opt_str(&body, "title"))
    .bind(opt_str(&body, "description"))
    .bind(due_date)
    .bind(opt_str(&body, "priority"))
    .bind(opt_str(&body, "category"))
    .bind(&status)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(row)).into_response())
}

/// PATCH /api/tasks/:id - partial merge
pub async fn patch(Path(id): Path<String>, Json(body): Json<Value>) -> Result<Json<DailyTask>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;

    let existing: DailyTask = sqlx::query_as("SELECT * FROM daily_tasks WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("task", id))?;

    let due_date = match body.get("dueDate") {
        None => existing.due_date,
        Some(Value::Null) => None,
        Some(_) => parse_optional_date(&body, "dueDate")?,
    };
    let status = match opt_str(&body, "status") {
        Some(_) => validated_status(&body, &existing.status)?,
        None => existing.status,
    };

    let row: DailyTask = sqlx::query_as(
        "UPDATE daily_tasks SET title = $1, description = $2, due_date = $3, priority = $4,
            category = $5, status = $6, updated_at = now()
         WHERE id = $7 RETURNING *",
    )
    .bind(opt_str(&body, "title").unwrap_or(existing.title))
    .bind(opt_str(&body, "description").or(existing.description))
    .bind(due_date)
    .bind(opt_str(&body, "priority").or(existing.priority))
    .bind(opt_str(&body, "category").or(existing.category))
    .bind(&status)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(row))
}

/// DELETE /api/tasks/:id - tasks are always removed outright
pub async fn delete(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;

    let deleted = sqlx::query("DELETE FROM daily_tasks WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::not_found("task", id));
    }
    Ok(Json(json!({ "message": "Task deleted", "id": id })))
}
