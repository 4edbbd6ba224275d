//! Finance surface. Responses use the wrapped envelope
//! `{ success, data, count?, summary? }`; summaries are reduced over the
//! fetched page of rows, not computed by a separate aggregate query.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{PgPool, QueryBuilder};

use crate::db::{unit_of_work, Database};
use crate::domain::finance::{
    Asset, Dividend, Liability, LiabilityPayment, MonthlyPayment, MonthlyPaymentRecord, Salary,
    SalaryInputs,
};
use crate::error::{ApiError, FieldError};
use crate::validate::{
    opt_str, parse_date, parse_decimal, parse_decimal_or_zero, parse_id, parse_optional_date,
    parse_optional_decimal, parse_optional_i64, require_fields, str_or_default,
};

pub(crate) fn totals_by_currency<'a, I>(rows: I) -> BTreeMap<String, Decimal>
where
    I: Iterator<Item = (&'a String, Decimal)>,
{
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for (currency, amount) in rows {
        *totals.entry(currency.clone()).or_insert(Decimal::ZERO) += amount;
    }
    totals
}

#[derive(Debug, Deserialize)]
pub struct AssetQuery {
    pub category: Option<String>,
}

/// GET /api/finance/assets
pub async fn list_assets(Query(query): Query<AssetQuery>) -> Result<Json<Value>, ApiError> {
    let pool = Database::pool().await?;

    let mut qb = QueryBuilder::new("SELECT * FROM assets WHERE 1=1");
    if let Some(category) = &query.category {
        qb.push(" AND category = ").push_bind(category);
    }
    qb.push(" ORDER BY id");

    let rows: Vec<Asset> = qb.build_query_as().fetch_all(&pool).await?;
    let summary = totals_by_currency(rows.iter().map(|a| (&a.currency, a.current_value)));
    let count = rows.len();

    Ok(Json(json!({
        "success": true,
        "data": rows,
        "count": count,
        "summary": { "totalCurrentValueByCurrency": summary },
    })))
}

/// POST /api/finance/assets
pub async fn create_asset(Json(body): Json<Value>) -> Result<Response, ApiError> {
    require_fields(&body, &["name", "currentValue"])?;

    let current_value = parse_decimal(&body, "currentValue")?;
    let purchase_value = parse_optional_decimal(&body, "purchaseValue")?;

    let pool = Database::pool().await?;
    let row: Asset = sqlx::query_as(
        "INSERT INTO assets (name, category, purchase_value, current_value, currency, notes)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(opt_str(&body, "name"))
    .bind(opt_str(&body, "category"))
    .bind(purchase_value)
    .bind(current_value)
    .bind(str_or_default(&body, "currency", "USD"))
    .bind(opt_str(&body, "notes"))
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": row })),
    )
        .into_response())
}

/// PATCH /api/finance/assets/:id
pub async fn patch_asset(Path(id): Path<String>, Json(body): Json<Value>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;

    let existing: Asset = sqlx::query_as("SELECT * FROM assets WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("asset", id))?;

    let current_value = parse_optional_decimal(&body, "currentValue")?.unwrap_or(existing.current_value);
    let purchase_value = match body.get("purchaseValue") {
        None => existing.purchase_value,
        Some(Value::Null) => None,
        Some(_) => parse_optional_decimal(&body, "purchaseValue")?,
    };

    let row: Asset = sqlx::query_as(
        "UPDATE assets SET name = $1, category = $2, purchase_value = $3, current_value = $4,
            currency = $5, notes = $6, updated_at = now()
         WHERE id = $7 RETURNING *",
    )
    .bind(opt_str(&body, "name").unwrap_or(existing.name))
    .bind(opt_str(&body, "category").or(existing.category))
    .bind(purchase_value)
    .bind(current_value)
    .bind(opt_str(&body, "currency").unwrap_or(existing.currency))
    .bind(opt_str(&body, "notes").or(existing.notes))
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": row })))
}

/// DELETE /api/finance/assets/:id
pub async fn delete_asset(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    let deleted = sqlx::query("DELETE FROM assets WHERE id = $1").bind(id).execute(&pool).await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::not_found("asset", id));
    }
    Ok(Json(json!({ "success": true, "data": { "message": "Asset deleted", "id": id } })))
}

/// GET /api/finance/liabilities
pub async fn list_liabilities() -> Result<Json<Value>, ApiError> {
    let pool = Database::pool().await?;
    let rows: Vec<Liability> = sqlx::query_as("SELECT * FROM liabilities ORDER BY id")
        .fetch_all(&pool)
        .await?;
    let summary = totals_by_currency(rows.iter().map(|l| (&l.currency, l.outstanding_balance)));
    let count = rows.len();

    Ok(Json(json!({
        "success": true,
        "data": rows,
        "count": count,
        "summary": { "outstandingByCurrency": summary },
    })))
}

/// POST /api/finance/liabilities - outstanding balance starts at the
/// original amount unless explicitly given
pub async fn create_liability(Json(body): Json<Value>) -> Result<Response, ApiError> {
    require_fields(&body, &["name", "originalAmount"])?;

    let original = parse_decimal(&body, "originalAmount")?;
    let outstanding = parse_optional_decimal(&body, "outstandingBalance")?.unwrap_or(original);
    let due_date = parse_optional_date(&body, "dueDate")?;

    let pool = Database::pool().await?;
    let row: Liability = sqlx::query_as(
        "INSERT INTO liabilities (name, lender, original_amount, outstanding_balance, currency, due_date)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(opt_str(&body, "name"))
    .bind(opt_str(&body, "lender"))
    .bind(original)
    .bind(outstanding)
    .bind(str_or_default(&body, "currency", "USD"))
    .bind(due_date)
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": row })),
    )
        .into_response())
}

async fn fetch_liability(pool: &PgPool, id: i64) -> Result<Liability, ApiError> {
    sqlx::query_as::<_, Liability>("SELECT * FROM liabilities WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("liability", id))
}

/// GET /api/finance/liabilities/:id/payments
pub async fn list_payments(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    let liability = fetch_liability(&pool, id).await?;

    let rows: Vec<LiabilityPayment> =
        sqlx::query_as("SELECT * FROM liability_payments WHERE liability_id = $1 ORDER BY paid_at, id")
            .bind(id)
            .fetch_all(&pool)
            .await?;
    let count = rows.len();

    Ok(Json(json!({
        "success": true,
        "data": rows,
        "count": count,
        "summary": { "outstandingBalance": liability.outstanding_balance },
    })))
}

/// POST /api/finance/liabilities/:id/payments - records the payment and
/// reduces the balance in one transaction
pub async fn create_payment(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    require_fields(&body, &["amount", "paidAt"])?;

    let amount = parse_decimal(&body, "amount")?;
    let paid_at = parse_date("paidAt", &opt_str(&body, "paidAt").unwrap_or_default())?;

    let pool = Database::pool().await?;
    fetch_liability(&pool, id).await?;

    let payment_id =
        unit_of_work::record_liability_payment(&pool, id, amount, paid_at, opt_str(&body, "note").as_deref())
            .await?;

    let row: LiabilityPayment = sqlx::query_as("SELECT * FROM liability_payments WHERE id = $1")
        .bind(payment_id)
        .fetch_one(&pool)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": row })),
    )
        .into_response())
}

/// DELETE /api/finance/liabilities/:id
pub async fn delete_liability(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    let deleted = sqlx::query("DELETE FROM liabilities WHERE id = $1").bind(id).execute(&pool).await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::not_found("liability", id));
    }
    Ok(Json(json!({ "success": true, "data": { "message": "Liability deleted", "id": id } })))
}

/// GET /api/finance/dividends
pub async fn list_dividends() -> Result<Json<Value>, ApiError> {
    let pool = Database::pool().await?;
    let rows: Vec<Dividend> = sqlx::query_as("SELECT * FROM dividends ORDER BY paid_at, id")
        .fetch_all(&pool)
        .await?;
    let summary = totals_by_currency(rows.iter().map(|d| (&d.currency, d.amount)));
    let count = rows.len();

    Ok(Json(json!({
        "success": true,
        "data": rows,
        "count": count,
        "summary": { "totalByCurrency": summary },
    })))
}

/// POST /api/finance/dividends
pub async fn create_dividend(Json(body): Json<Value>) -> Result<Response, ApiError> {
    require_fields(&body, &["source", "amount"])?;

    let amount = parse_decimal(&body, "amount")?;
    let paid_at = parse_optional_date(&body, "paidAt")?;

    let pool = Database::pool().await?;
    let row: Dividend = sqlx::query_as(
        "INSERT INTO dividends (source, amount, currency, paid_at, notes)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(opt_str(&body, "source"))
    .bind(amount)
    .bind(str_or_default(&body, "currency", "USD"))
    .bind(paid_at)
    .bind(opt_str(&body, "notes"))
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": row })),
    )
        .into_response())
}

/// DELETE /api/finance/dividends/:id
pub async fn delete_dividend(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    let deleted = sqlx::query("DELETE FROM dividends WHERE id = $1").bind(id).execute(&pool).await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::not_found("dividend", id));
    }
    Ok(Json(json!({ "success": true, "data": { "message": "Dividend deleted", "id": id } })))
}

fn parse_due_day(body: &Value) -> Result<Option<i32>, ApiError> {
    match parse_optional_i64(body, "dueDay")? {
        None => Ok(None),
        Some(d) if (1..=31).contains(&d) => Ok(Some(d as i32)),
        Some(d) => Err(ApiError::validation(
            "Invalid due day",
            vec![FieldError::invalid(
                "dueDay",
                format!("expected a day of month between 1 and 31, got {}", d),
            )],
        )),
    }
}

/// GET /api/finance/monthly-payments - summary covers active entries only
pub async fn list_monthly_payments() -> Result<Json<Value>, ApiError> {
    let pool = Database::pool().await?;
    let rows: Vec<MonthlyPayment> = sqlx::query_as("SELECT * FROM monthly_payments ORDER BY id")
        .fetch_all(&pool)
        .await?;
    let summary = totals_by_currency(
        rows.iter()
            .filter(|m| m.active)
            .map(|m| (&m.currency, m.amount)),
    );
    let count = rows.len();

    Ok(Json(json!({
        "success": true,
        "data": rows,
        "count": count,
        "summary": { "activeTotalByCurrency": summary },
    })))
}

/// POST /api/finance/monthly-payments
pub async fn create_monthly_payment(Json(body): Json<Value>) -> Result<Response, ApiError> {
    require_fields(&body, &["name", "amount"])?;

    let amount = parse_decimal(&body, "amount")?;
    let due_day = parse_due_day(&body)?;
    let active = body.get("active").and_then(|v| v.as_bool()).unwrap_or(true);

    let pool = Database::pool().await?;
    let row: MonthlyPayment = sqlx::query_as(
        "INSERT INTO monthly_payments (name, category, amount, currency, due_day, active, notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(opt_str(&body, "name"))
    .bind(opt_str(&body, "category"))
    .bind(amount)
    .bind(str_or_default(&body, "currency", "USD"))
    .bind(due_day)
    .bind(active)
    .bind(opt_str(&body, "notes"))
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": row })),
    )
        .into_response())
}

async fn fetch_monthly_payment(pool: &PgPool, id: i64) -> Result<MonthlyPayment, ApiError> {
    sqlx::query_as::<_, MonthlyPayment>("SELECT * FROM monthly_payments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("monthly payment", id))
}

/// DELETE /api/finance/monthly-payments/:id - cascades to its payment history
pub async fn delete_monthly_payment(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    let deleted = sqlx::query("DELETE FROM monthly_payments WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::not_found("monthly payment", id));
    }
    Ok(Json(json!({ "success": true, "data": { "message": "Monthly payment deleted", "id": id } })))
}

/// GET /api/finance/monthly-payments/:id/payments
pub async fn list_monthly_payment_records(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    fetch_monthly_payment(&pool, id).await?;

    let rows: Vec<MonthlyPaymentRecord> = sqlx::query_as(
        "SELECT * FROM monthly_payment_records WHERE monthly_payment_id = $1 ORDER BY paid_at, id",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;
    let count = rows.len();

    Ok(Json(json!({ "success": true, "data": rows, "count": count })))
}

/// POST /api/finance/monthly-payments/:id/payments - appends to the history;
/// unlike liabilities there is no balance to reduce
pub async fn create_monthly_payment_record(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    require_fields(&body, &["amount", "paidAt"])?;

    let amount = parse_decimal(&body, "amount")?;
    let paid_at = parse_date("paidAt", &opt_str(&body, "paidAt").unwrap_or_default())?;

    let pool = Database::pool().await?;
    fetch_monthly_payment(&pool, id).await?;

    let row: MonthlyPaymentRecord = sqlx::query_as(
        "INSERT INTO monthly_payment_records (monthly_payment_id, amount, paid_at, note)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(id)
    .bind(amount)
    .bind(paid_at)
    .bind(opt_str(&body, "note"))
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": row })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryQuery {
    pub employee_id: Option<i64>,
    pub period: Option<String>,
}

/// GET /api/finance/salaries
pub async fn list_salaries(Query(query): Query<SalaryQuery>) -> Result<Json<Value>, ApiError> {
    let pool = Database::pool().await?;

    let mut qb = QueryBuilder::new("SELECT * FROM salaries WHERE 1=1");
    if let Some(employee_id) = query.employee_id {
        qb.push(" AND employee_id = ").push_bind(employee_id);
    }
    if let Some(period) = &query.period {
        qb.push(" AND period = ").push_bind(period);
    }
    qb.push(" ORDER BY id");

    let rows: Vec<Salary> = qb.build_query_as().fetch_all(&pool).await?;
    let summary = totals_by_currency(rows.iter().map(|s| (&s.currency, s.net_salary)));
    let count = rows.len();

    Ok(Json(json!({
        "success": true,
        "data": rows,
        "count": count,
        "summary": { "netByCurrency": summary },
    })))
}

/// POST /api/finance/salaries - totals, gross and net are derived
/// server-side; any client-supplied values for them are ignored
pub async fn create_salary(Json(body): Json<Value>) -> Result<Response, ApiError> {
    require_fields(&body, &["period", "baseSalary"])?;

    let inputs = SalaryInputs {
        base_salary: parse_decimal(&body, "baseSalary")?,
        housing_allowance: parse_decimal_or_zero(&body, "housingAllowance")?,
        transport_allowance: parse_decimal_or_zero(&body, "transportAllowance")?,
        other_allowances: parse_decimal_or_zero(&body, "otherAllowances")?,
        tax_deduction: parse_decimal_or_zero(&body, "taxDeduction")?,
        insurance_deduction: parse_decimal_or_zero(&body, "insuranceDeduction")?,
        other_deductions: parse_decimal_or_zero(&body, "otherDeductions")?,
    };
    let breakdown = inputs.compute();
    let employee_id = parse_optional_i64(&body, "employeeId")?;

    let pool = Database::pool().await?;

    if let Some(employee_id) = employee_id {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM employees WHERE id = $1")
            .bind(employee_id)
            .fetch_optional(&pool)
            .await?;
        if exists.is_none() {
            return Err(ApiError::not_found("employee", employee_id));
        }
    }

    let row: Salary = sqlx::query_as(
        "INSERT INTO salaries (employee_id, period, base_salary, housing_allowance,
            transport_allowance, other_allowances, total_allowances, gross_salary,
            tax_deduction, insurance_deduction, other_deductions, total_deductions,
            net_salary, currency)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING *",
    )
    .bind(employee_id)
    .bind(opt_str(&body, "period"))
    .bind(inputs.base_salary)
    .bind(inputs.housing_allowance)
    .bind(inputs.transport_allowance)
    .bind(inputs.other_allowances)
    .bind(breakdown.total_allowances)
    .bind(breakdown.gross_salary)
    .bind(inputs.tax_deduction)
    .bind(inputs.insurance_deduction)
    .bind(inputs.other_deductions)
    .bind(breakdown.total_deductions)
    .bind(breakdown.net_salary)
    .bind(str_or_default(&body, "currency", "USD"))
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": row })),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn due_day_must_be_a_day_of_month() {
        assert_eq!(parse_due_day(&json!({ "dueDay": 15 })).unwrap(), Some(15));
        assert_eq!(parse_due_day(&json!({})).unwrap(), None);
        assert_eq!(parse_due_day(&json!({ "dueDay": 0 })).unwrap_err().status_code(), 400);
        assert_eq!(parse_due_day(&json!({ "dueDay": 32 })).unwrap_err().status_code(), 400);
        assert_eq!(parse_due_day(&json!({ "dueDay": "15" })).unwrap_err().status_code(), 400);
    }

    #[test]
    fn currency_totals_reduce_over_the_page() {
        let usd = "USD".to_string();
        let gbp = "GBP".to_string();
        let rows = vec![
            (&usd, Decimal::from(100)),
            (&gbp, Decimal::from(50)),
            (&usd, Decimal::from(25)),
        ];
        let totals = totals_by_currency(rows.into_iter());
        assert_eq!(totals["USD"], Decimal::from(125));
        assert_eq!(totals["GBP"], Decimal::from(50));
    }
}
