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
use crate::domain::employee::{self, Employee, EmploymentStatus};
use crate::error::{ApiError, FieldError};
use crate::validate::{opt_str, parse_id, parse_optional_str, require_fields, str_or_default};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub department: Option<String>,
    pub search: Option<String>,
}

/// GET /api/employees - bare array, optional status/department/search filters
pub async fn list(Query(query): Query<ListQuery>) -> Result<Json<Vec<Employee>>, ApiError> {
    let pool = Database::pool().await?;

    let mut qb = QueryBuilder::new("SELECT * FROM employees WHERE 1=1");
    if let Some(status) = &query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(department) = &query.department {
        qb.push(" AND department = ").push_bind(department);
    }
    if let Some(search) = &query.search {
        qb.push(" AND (full_name ILIKE ").push_bind(format!("%{}%", search));
        qb.push(" OR email ILIKE ").push_bind(format!("%{}%", search));
        qb.push(")");
    }
    qb.push(" ORDER BY id");

    let rows: Vec<Employee> = qb.build_query_as().fetch_all(&pool).await?;
    Ok(Json(rows))
}

/// GET /api/employees/:id
pub async fn get(Path(id): Path<String>) -> Result<Json<Employee>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;

    let row: Option<Employee> = sqlx::query_as("SELECT * FROM employees WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;

    row.map(Json).ok_or_else(|| ApiError::not_found("employee", id))
}

fn validated_status(body: &Value, default: &str) -> Result<String, ApiError> {
    let status = str_or_default(body, "status", default);
    status.parse::<EmploymentStatus>().map_err(|msg| {
        ApiError::validation("Invalid status", vec![FieldError::invalid("status", msg)])
    })?;
    Ok(status)
}

/// POST /api/employees - requires firstName, lastName, email
pub async fn create(Json(body): Json<Value>) -> Result<Response, ApiError> {
    require_fields(&body, &["firstName", "lastName", "email"])?;

    // Name parts feed the derived full_name, so a wrong-typed value is a 400
    // rather than a silently empty component.
    let first = parse_optional_str(&body, "firstName")?.unwrap_or_default();
    let middle = parse_optional_str(&body, "middleName")?;
    let last = parse_optional_str(&body, "lastName")?.unwrap_or_default();
    let full_name = employee::full_name(&first, middle.as_deref(), &last);
    let status = validated_status(&body, "ACTIVE")?;
    let salary = crate::validate::parse_optional_decimal(&body, "salary")?;

    let pool = Database::pool().await?;
    let row: Employee = sqlx::query_as(
        "INSERT INTO employees (first_name, middle_name, last_name, full_name, email, phone,
            department, \"position\", employment_type, status, salary, currency,
            street, city, state, postal_code, country, bank_name, tax_id, ssn)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
         RETURNING *",
    )
    .bind(&first)
    .bind(&middle)
    .bind(&last)
    .bind(&full_name)
    .bind(opt_str(&body, "email"))
    .bind(opt_str(&body, "phone"))
    .bind(opt_str(&body, "department"))
    .bind(opt_str(&body, "position"))
    .bind(opt_str(&body, "employmentType"))
    .bind(&status)
    .bind(salary)
    .bind(opt_str(&body, "currency"))
    .bind(opt_str(&body, "street"))
    .bind(opt_str(&body, "city"))
    .bind(opt_str(&body, "state"))
    .bind(opt_str(&body, "postalCode"))
    .bind(opt_str(&body, "country"))
    .bind(opt_str(&body, "bankName"))
    .bind(opt_str(&body, "taxId"))
    .bind(opt_str(&body, "ssn"))
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(row)).into_response())
}

/// PUT /api/employees/:id - requires the create-time fields, then merges into
/// the existing row the same way PATCH does; omitted optional fields keep
/// their stored values
pub async fn update(Path(id): Path<String>, Json(body): Json<Value>) -> Result<Json<Employee>, ApiError> {
    require_fields(&body, &["firstName", "lastName", "email"])?;
    patch_inner(&id, body).await.map(Json)
}

/// PATCH /api/employees/:id - partial merge into the existing row
pub async fn patch(Path(id): Path<String>, Json(body): Json<Value>) -> Result<Json<Employee>, ApiError> {
    patch_inner(&id, body).await.map(Json)
}

async fn patch_inner(raw_id: &str, body: Value) -> Result<Employee, ApiError> {
    let id = parse_id(raw_id)?;
    let pool = Database::pool().await?;

    let existing: Employee = sqlx::query_as("SELECT * FROM employees WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("employee", id))?;

    let first = parse_optional_str(&body, "firstName")?.unwrap_or(existing.first_name);
    let middle = match body.get("middleName") {
        None => existing.middle_name,
        Some(Value::Null) => None,
        Some(_) => parse_optional_str(&body, "middleName")?,
    };
    let last = parse_optional_str(&body, "lastName")?.unwrap_or(existing.last_name);
    // Derived, never taken from the client even when supplied.
    let full_name = employee::full_name(&first, middle.as_deref(), &last);

    let status = match opt_str(&body, "status") {
        Some(_) => validated_status(&body, &existing.status)?,
        None => existing.status,
    };
    let salary = match body.get("salary") {
        None => existing.salary,
        Some(Value::Null) => None,
        Some(_) => crate::validate::parse_optional_decimal(&body, "salary")?,
    };

    let row: Employee = sqlx::query_as(
        "UPDATE employees SET first_name = $1, middle_name = $2, last_name = $3, full_name = $4,
            email = $5, phone = $6, department = $7, \"position\" = $8, employment_type = $9,
            status = $10, salary = $11, currency = $12, street = $13, city = $14, state = $15,
            postal_code = $16, country = $17, bank_name = $18, tax_id = $19, ssn = $20,
            updated_at = now()
         WHERE id = $21 RETURNING *",
    )
    .bind(&first)
    .bind(&middle)
    .bind(&last)
    .bind(&full_name)
    .bind(opt_str(&body, "email").unwrap_or(existing.email))
    .bind(opt_str(&body, "phone").or(existing.phone))
    .bind(opt_str(&body, "department").or(existing.department))
    .bind(opt_str(&body, "position").or(existing.position))
    .bind(opt_str(&body, "employmentType").or(existing.employment_type))
    .bind(&status)
    .bind(salary)
    .bind(opt_str(&body, "currency").or(existing.currency))
    .bind(opt_str(&body, "street").or(existing.street))
    .bind(opt_str(&body, "city").or(existing.city))
    .bind(opt_str(&body, "state").or(existing.state))
    .bind(opt_str(&body, "postalCode").or(existing.postal_code))
    .bind(opt_str(&body, "country").or(existing.country))
    .bind(opt_str(&body, "bankName").or(existing.bank_name))
    .bind(opt_str(&body, "taxId").or(existing.tax_id))
    .bind(opt_str(&body, "ssn").or(existing.ssn))
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(row)
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub soft: Option<bool>,
}

/// DELETE /api/employees/:id - default hard delete; `?soft=true` flips the
/// status to INACTIVE and keeps the row queryable.
pub async fn delete(
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;

    if query.soft.unwrap_or(false) {
        let updated = sqlx::query(
            "UPDATE employees SET status = 'INACTIVE', updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(ApiError::not_found("employee", id));
        }
        Ok(Json(json!({ "message": "Employee marked inactive", "id": id })))
    } else {
        let deleted = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(ApiError::not_found("employee", id));
        }
        Ok(Json(json!({ "message": "Employee deleted", "id": id })))
    }
}
