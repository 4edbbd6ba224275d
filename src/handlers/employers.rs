use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{PgPool, QueryBuilder};

use crate::db::{unit_of_work, Database};
use crate::domain::employer::{Employer, EmployerContact, EmployerType};
use crate::dto::employer::to_response_dto;
use crate::error::{ApiError, FieldError};
use crate::validate::{opt_str, parse_id, require_fields};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    #[serde(rename = "employerType")]
    pub employer_type: Option<String>,
}

/// GET /api/employers
pub async fn list(Query(query): Query<ListQuery>) -> Result<Json<Vec<Employer>>, ApiError> {
    let pool = Database::pool().await?;

    let mut qb = QueryBuilder::new("SELECT * FROM employers WHERE 1=1");
    if let Some(status) = &query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(employer_type) = &query.employer_type {
        qb.push(" AND employer_type = ").push_bind(employer_type);
    }
    qb.push(" ORDER BY id");

    let rows: Vec<Employer> = qb.build_query_as().fetch_all(&pool).await?;
    Ok(Json(rows))
}

async fn fetch_employer(pool: &PgPool, id: i64) -> Result<Employer, ApiError> {
    sqlx::query_as::<_, Employer>("SELECT * FROM employers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("employer", id))
}

async fn fetch_contacts(pool: &PgPool, employer_id: i64) -> Result<Vec<EmployerContact>, ApiError> {
    let rows = sqlx::query_as::<_, EmployerContact>(
        "SELECT * FROM employer_contacts WHERE employer_id = $1 ORDER BY id",
    )
    .bind(employer_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// GET /api/employers/:id - bare employer with its contacts embedded
pub async fn get(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;

    let employer = fetch_employer(&pool, id).await?;
    let contacts = fetch_contacts(&pool, id).await?;

    let mut body = serde_json::to_value(&employer).map_err(|e| ApiError::internal(e.to_string()))?;
    body["contacts"] = json!(contacts);
    Ok(Json(body))
}

/// GET /api/v2/employers/:id - DTO-mapped, wrapped envelope
pub async fn get_v2(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;

    let employer = fetch_employer(&pool, id).await?;
    let contacts = fetch_contacts(&pool, id).await?;

    Ok(Json(json!({
        "success": true,
        "data": to_response_dto(&employer, &contacts),
    })))
}

/// POST /api/employers - type-dependent required fields: companies need a
/// companyName, individuals need firstName and lastName.
pub async fn create(Json(body): Json<Value>) -> Result<Response, ApiError> {
    require_fields(&body, &["employerType"])?;

    let employer_type_raw = opt_str(&body, "employerType").unwrap_or_default();
    let employer_type = employer_type_raw.parse::<EmployerType>().map_err(|msg| {
        ApiError::validation(
            "Invalid employer type",
            vec![FieldError::invalid("employerType", msg)],
        )
    })?;

    match employer_type {
        EmployerType::Company => require_fields(&body, &["companyName"])?,
        EmployerType::Individual => require_fields(&body, &["firstName", "lastName"])?,
    }

    let pool = Database::pool().await?;
    let row: Employer = sqlx::query_as(
        "INSERT INTO employers (employer_type, company_name, trading_name, registration_number,
            first_name, last_name, profession, email, phone, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'ACTIVE') RETURNING *",
    )
    .bind(employer_type.to_string())
    .bind(opt_str(&body, "companyName"))
    .bind(opt_str(&body, "tradingName"))
    .bind(opt_str(&body, "registrationNumber"))
    .bind(opt_str(&body, "firstName"))
    .bind(opt_str(&body, "lastName"))
    .bind(opt_str(&body, "profession"))
    .bind(opt_str(&body, "email"))
    .bind(opt_str(&body, "phone"))
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(row)).into_response())
}

/// PATCH /api/employers/:id - partial merge; the type tag itself is immutable
pub async fn patch(Path(id): Path<String>, Json(body): Json<Value>) -> Result<Json<Employer>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    let existing = fetch_employer(&pool, id).await?;

    if let Some(new_type) = opt_str(&body, "employerType") {
        if new_type != existing.employer_type {
            return Err(ApiError::domain("employerType cannot be changed after creation"));
        }
    }

    let row: Employer = sqlx::query_as(
        "UPDATE employers SET company_name = $1, trading_name = $2, registration_number = $3,
            first_name = $4, last_name = $5, profession = $6, email = $7, phone = $8,
            status = $9, updated_at = now()
         WHERE id = $10 RETURNING *",
    )
    .bind(opt_str(&body, "companyName").or(existing.company_name))
    .bind(opt_str(&body, "tradingName").or(existing.trading_name))
    .bind(opt_str(&body, "registrationNumber").or(existing.registration_number))
    .bind(opt_str(&body, "firstName").or(existing.first_name))
    .bind(opt_str(&body, "lastName").or(existing.last_name))
    .bind(opt_str(&body, "profession").or(existing.profession))
    .bind(opt_str(&body, "email").or(existing.email))
    .bind(opt_str(&body, "phone").or(existing.phone))
    .bind(opt_str(&body, "status").unwrap_or(existing.status))
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(row))
}

/// DELETE /api/employers/:id - cascades to contacts (FK ON DELETE CASCADE)
pub async fn delete(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;

    let deleted = sqlx::query("DELETE FROM employers WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::not_found("employer", id));
    }
    Ok(Json(json!({ "message": "Employer and contacts deleted", "id": id })))
}

/// GET /api/employers/:id/contacts - parent existence is checked first
pub async fn list_contacts(Path(id): Path<String>) -> Result<Json<Vec<EmployerContact>>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    fetch_employer(&pool, id).await?;
    Ok(Json(fetch_contacts(&pool, id).await?))
}

/// POST /api/employers/:id/contacts - `isPrimary: true` demotes every sibling
/// in the same transaction, so at most one primary is ever observable.
pub async fn create_contact(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    require_fields(&body, &["name"])?;

    let pool = Database::pool().await?;
    fetch_employer(&pool, id).await?;

    let name = opt_str(&body, "name").unwrap_or_default();
    let role = opt_str(&body, "role");
    let email = opt_str(&body, "email");
    let phone = opt_str(&body, "phone");
    let is_primary = body.get("isPrimary").and_then(|v| v.as_bool()).unwrap_or(false);

    let contact_id = if is_primary {
        unit_of_work::insert_primary_contact(
            &pool,
            id,
            &name,
            role.as_deref(),
            email.as_deref(),
            phone.as_deref(),
        )
        .await?
    } else {
        let (contact_id,): (i64,) = sqlx::query_as(
            "INSERT INTO employer_contacts (employer_id, name, role, email, phone, is_primary)
             VALUES ($1, $2, $3, $4, $5, FALSE) RETURNING id",
        )
        .bind(id)
        .bind(&name)
        .bind(&role)
        .bind(&email)
        .bind(&phone)
        .fetch_one(&pool)
        .await?;
        contact_id
    };

    let row: EmployerContact = sqlx::query_as("SELECT * FROM employer_contacts WHERE id = $1")
        .bind(contact_id)
        .fetch_one(&pool)
        .await?;

    Ok((StatusCode::CREATED, Json(row)).into_response())
}

/// PUT /api/employers/:id/contacts/:contactId
pub async fn update_contact(
    Path((id, contact_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<EmployerContact>, ApiError> {
    let id = parse_id(&id)?;
    let contact_id = parse_id(&contact_id)?;

    let pool = Database::pool().await?;
    fetch_employer(&pool, id).await?;

    let existing: EmployerContact = sqlx::query_as(
        "SELECT * FROM employer_contacts WHERE id = $1 AND employer_id = $2",
    )
    .bind(contact_id)
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("contact", contact_id))?;

    sqlx::query(
        "UPDATE employer_contacts SET name = $1, role = $2, email = $3, phone = $4, updated_at = now()
         WHERE id = $5",
    )
    .bind(opt_str(&body, "name").unwrap_or(existing.name))
    .bind(opt_str(&body, "role").or(existing.role))
    .bind(opt_str(&body, "email").or(existing.email))
    .bind(opt_str(&body, "phone").or(existing.phone))
    .bind(contact_id)
    .execute(&pool)
    .await?;

    match body.get("isPrimary").and_then(|v| v.as_bool()) {
        Some(true) => {
            unit_of_work::promote_primary_contact(&pool, id, contact_id).await?;
        }
        Some(false) => {
            sqlx::query("UPDATE employer_contacts SET is_primary = FALSE, updated_at = now() WHERE id = $1")
                .bind(contact_id)
                .execute(&pool)
                .await?;
        }
        None => {}
    }

    let row: EmployerContact = sqlx::query_as("SELECT * FROM employer_contacts WHERE id = $1")
        .bind(contact_id)
        .fetch_one(&pool)
        .await?;
    Ok(Json(row))
}

/// DELETE /api/employers/:id/contacts/:contactId
pub async fn delete_contact(
    Path((id, contact_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let contact_id = parse_id(&contact_id)?;
    let pool = Database::pool().await?;

    let deleted = sqlx::query("DELETE FROM employer_contacts WHERE id = $1 AND employer_id = $2")
        .bind(contact_id)
        .bind(id)
        .execute(&pool)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::not_found("contact", contact_id));
    }
    Ok(Json(json!({ "message": "Contact deleted", "id": contact_id })))
}
