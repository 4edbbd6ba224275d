//! Property portfolio and tenancy. Creating a tenant flips the parent
//! property to rented inside one transaction.

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
use crate::domain::finance::{Property, PropertyTenant};
use crate::error::ApiError;
use crate::handlers::finance::totals_by_currency;
use crate::validate::{
    opt_str, parse_id, parse_optional_date, parse_optional_decimal, require_fields, str_or_default,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub is_rented: Option<bool>,
    pub city: Option<String>,
}

/// GET /api/finance/properties
pub async fn list(Query(query): Query<ListQuery>) -> Result<Json<Value>, ApiError> {
    let pool = Database::pool().await?;

    let mut qb = QueryBuilder::new("SELECT * FROM properties WHERE 1=1");
    if let Some(is_rented) = query.is_rented {
        qb.push(" AND is_rented = ").push_bind(is_rented);
    }
    if let Some(city) = &query.city {
        qb.push(" AND city = ").push_bind(city);
    }
    qb.push(" ORDER BY id");

    let rows: Vec<Property> = qb.build_query_as().fetch_all(&pool).await?;
    let summary = totals_by_currency(
        rows.iter()
            .filter_map(|p| p.market_value.map(|v| (&p.currency, v))),
    );
    let rented = rows.iter().filter(|p| p.is_rented).count();
    let count = rows.len();

    Ok(Json(json!({
        "success": true,
        "data": rows,
        "count": count,
        "summary": {
            "totalMarketValueByCurrency": summary,
            "rentedCount": rented,
        },
    })))
}

/// POST /api/finance/properties
pub async fn create(Json(body): Json<Value>) -> Result<Response, ApiError> {
    require_fields(&body, &["name"])?;

    let market_value = parse_optional_decimal(&body, "marketValue")?;

    let pool = Database::pool().await?;
    let row: Property = sqlx::query_as(
        "INSERT INTO properties (name, address, city, country, market_value, currency, is_rented)
         VALUES ($1, $2, $3, $4, $5, $6, FALSE) RETURNING *",
    )
    .bind(opt_str(&body, "name"))
    .bind(opt_str(&body, "address"))
    .bind(opt_str(&body, "city"))
    .bind(opt_str(&body, "country"))
    .bind(market_value)
    .bind(str_or_default(&body, "currency", "USD"))
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": row })),
    )
        .into_response())
}

async fn fetch_property(pool: &PgPool, id: i64) -> Result<Property, ApiError> {
    sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("property", id))
}

/// GET /api/finance/properties/:id - property with its tenants embedded
pub async fn get(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;

    let property = fetch_property(&pool, id).await?;
    let tenants: Vec<PropertyTenant> =
        sqlx::query_as("SELECT * FROM property_tenants WHERE property_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(&pool)
            .await?;

    let mut data = serde_json::to_value(&property).map_err(|e| ApiError::internal(e.to_string()))?;
    data["tenants"] = json!(tenants);
    Ok(Json(json!({ "success": true, "data": data })))
}

/// PATCH /api/finance/properties/:id - `isRented` is derived from tenancy,
/// never set directly
pub async fn patch(Path(id): Path<String>, Json(body): Json<Value>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    if body.get("isRented").is_some() {
        return Err(ApiError::domain(
            "isRented is derived from tenants and cannot be set directly",
        ));
    }

    let pool = Database::pool().await?;
    let existing = fetch_property(&pool, id).await?;

    let market_value = match body.get("marketValue") {
        None => existing.market_value,
        Some(Value::Null) => None,
        Some(_) => parse_optional_decimal(&body, "marketValue")?,
    };

    let row: Property = sqlx::query_as(
        "UPDATE properties SET name = $1, address = $2, city = $3, country = $4,
            market_value = $5, currency = $6, updated_at = now()
         WHERE id = $7 RETURNING *",
    )
    .bind(opt_str(&body, "name").unwrap_or(existing.name))
    .bind(opt_str(&body, "address").or(existing.address))
    .bind(opt_str(&body, "city").or(existing.city))
    .bind(opt_str(&body, "country").or(existing.country))
    .bind(market_value)
    .bind(opt_str(&body, "currency").unwrap_or(existing.currency))
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": row })))
}

/// DELETE /api/finance/properties/:id - cascades to tenants
pub async fn delete(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;

    let deleted = sqlx::query("DELETE FROM properties WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::not_found("property", id));
    }
    Ok(Json(json!({ "success": true, "data": { "message": "Property deleted", "id": id } })))
}

/// GET /api/finance/properties/:id/tenants
pub async fn list_tenants(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    fetch_property(&pool, id).await?;

    let rows: Vec<PropertyTenant> =
        sqlx::query_as("SELECT * FROM property_tenants WHERE property_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(&pool)
            .await?;
    let count = rows.len();

    Ok(Json(json!({ "success": true, "data": rows, "count": count })))
}

/// POST /api/finance/properties/:id/tenants - inserts the tenant and marks
/// the property rented in the same transaction
pub async fn create_tenant(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    require_fields(&body, &["name"])?;

    let monthly_rent = parse_optional_decimal(&body, "monthlyRent")?;
    let lease_start = parse_optional_date(&body, "leaseStart")?;
    let lease_end = parse_optional_date(&body, "leaseEnd")?;
    let is_primary = body.get("isPrimary").and_then(|v| v.as_bool()).unwrap_or(false);

    let pool = Database::pool().await?;
    fetch_property(&pool, id).await?;

    let name = opt_str(&body, "name").unwrap_or_default();
    let email = opt_str(&body, "email");
    let phone = opt_str(&body, "phone");
    let currency = opt_str(&body, "currency");

    let tenant_id = unit_of_work::insert_tenant_marking_rented(
        &pool,
        id,
        &name,
        email.as_deref(),
        phone.as_deref(),
        monthly_rent,
        currency.as_deref(),
        lease_start,
        lease_end,
        is_primary,
    )
    .await?;

    let row: PropertyTenant = sqlx::query_as("SELECT * FROM property_tenants WHERE id = $1")
        .bind(tenant_id)
        .fetch_one(&pool)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": row })),
    )
        .into_response())
}
