use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{PgPool, QueryBuilder};

use crate::db::Database;
use crate::domain::schedule::{Meeting, MeetingStatus};
use crate::error::{ApiError, FieldError};
use crate::validate::{
    opt_str, parse_date, parse_id, parse_optional_i64, require_fields, str_or_default,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub status: Option<String>,
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub related_to: Option<String>,
}

/// GET /api/meetings - bare array; filters by status, exact date or a
/// from/to date range, and relatedTo
pub async fn list(Query(query): Query<ListQuery>) -> Result<Json<Vec<Meeting>>, ApiError> {
    let date = match &query.date {
        Some(raw) => Some(parse_date("date", raw)?),
        None => None,
    };
    let from = match &query.from {
        Some(raw) => Some(parse_date("from", raw)?),
        None => None,
    };
    let to = match &query.to {
        Some(raw) => Some(parse_date("to", raw)?),
        None => None,
    };

    let pool = Database::pool().await?;
    let mut qb = QueryBuilder::new("SELECT * FROM meetings WHERE 1=1");
    if let Some(status) = &query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(date) = date {
        qb.push(" AND date = ").push_bind(date);
    }
    if let Some(from) = from {
        qb.push(" AND date >= ").push_bind(from);
    }
    if let Some(to) = to {
        qb.push(" AND date <= ").push_bind(to);
    }
    if let Some(related_to) = &query.related_to {
        qb.push(" AND related_to = ").push_bind(related_to);
    }
    qb.push(" ORDER BY date, start_time, id");

    let rows: Vec<Meeting> = qb.build_query_as().fetch_all(&pool).await?;
    Ok(Json(rows))
}

async fn fetch_meeting(pool: &PgPool, id: i64) -> Result<Meeting, ApiError> {
    sqlx::query_as::<_, Meeting>("SELECT * FROM meetings WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("meeting", id))
}

/// GET /api/meetings/:id
pub async fn get(Path(id): Path<String>) -> Result<Json<Meeting>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    Ok(Json(fetch_meeting(&pool, id).await?))
}

fn validated_status(body: &Value, default: &str) -> Result<String, ApiError> {
    let status = str_or_default(body, "status", default);
    status.parse::<MeetingStatus>().map_err(|msg| {
        ApiError::validation("Invalid status", vec![FieldError::invalid("status", msg)])
    })?;
    Ok(status)
}

/// POST /api/meetings - requires title, date, startTime
pub async fn create(Json(body): Json<Value>) -> Result<Response, ApiError> {
    require_fields(&body, &["title", "date", "startTime"])?;

    let date = parse_date("date", &opt_str(&body, "date").unwrap_or_default())?;
    let status = validated_status(&body, "SCHEDULED")?;
    let related_id = parse_optional_i64(&body, "relatedId")?;

    let pool = Database::pool().await?;
    let row: Meeting = sqlx::query_as(
        "INSERT INTO meetings (title, date, start_time, end_time, location, agenda, status, related_to, related_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
    )
    .bind(opt_str(&body, "title"))
    .bind(date)
    .bind(opt_str(&body, "startTime"))
    .bind(opt_str(&body, "endTime"))
    .bind(opt_str(&body, "location"))
    .bind(opt_str(&body, "agenda"))
    .bind(&status)
    .bind(opt_str(&body, "relatedTo"))
    .bind(related_id)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(row)).into_response())
}

/// PATCH /api/meetings/:id - partial merge
pub async fn patch(Path(id): Path<String>, Json(body): Json<Value>) -> Result<Json<Meeting>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    let existing = fetch_meeting(&pool, id).await?;

    let date = match opt_str(&body, "date") {
        Some(raw) => parse_date("date", &raw)?,
        None => existing.date,
    };
    let status = match opt_str(&body, "status") {
        Some(_) => validated_status(&body, &existing.status)?,
        None => existing.status,
    };
    let related_id = match body.get("relatedId") {
        None => existing.related_id,
        Some(Value::Null) => None,
        Some(_) => parse_optional_i64(&body, "relatedId")?,
    };

    let row: Meeting = sqlx::query_as(
        "UPDATE meetings SET title = $1, date = $2, start_time = $3, end_time = $4,
            location = $5, agenda = $6, status = $7, related_to = $8, related_id = $9,
            updated_at = now()
         WHERE id = $10 RETURNING *",
    )
    .bind(opt_str(&body, "title").unwrap_or(existing.title))
    .bind(date)
    .bind(opt_str(&body, "startTime").unwrap_or(existing.start_time))
    .bind(opt_str(&body, "endTime").or(existing.end_time))
    .bind(opt_str(&body, "location").or(existing.location))
    .bind(opt_str(&body, "agenda").or(existing.agenda))
    .bind(&status)
    .bind(opt_str(&body, "relatedTo").or(existing.related_to))
    .bind(related_id)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(row))
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub soft: Option<bool>,
}

/// DELETE /api/meetings/:id - `?soft=true` cancels instead of deleting
pub async fn delete(
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;

    if query.soft.unwrap_or(false) {
        let updated = sqlx::query(
            "UPDATE meetings SET status = 'CANCELLED', updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(ApiError::not_found("meeting", id));
        }
        Ok(Json(json!({ "message": "Meeting cancelled", "id": id })))
    } else {
        let deleted = sqlx::query("DELETE FROM meetings WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(ApiError::not_found("meeting", id));
        }
        Ok(Json(json!({ "message": "Meeting deleted", "id": id })))
    }
}

/// POST /api/meetings/:id/remind - dispatches a reminder over the configured
/// channels; per-channel failure is reported, never a 5xx
pub async fn remind(Path(id): Path<String>, Json(body): Json<Value>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    let meeting = fetch_meeting(&pool, id).await?;

    let recipient_email = opt_str(&body, "email");
    let recipient_phone = opt_str(&body, "phone");

    let results = crate::notify::send_meeting_reminder(
        &meeting,
        recipient_email.as_deref(),
        recipient_phone.as_deref(),
    )
    .await;

    Ok(Json(json!({ "meetingId": id, "results": results })))
}
