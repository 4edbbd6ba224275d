//! Multi-step write sequences that must not expose an intermediate state.
//! Each function runs its statements inside a single transaction: the
//! sibling-primary swap can never be read with two primaries set, and a
//! tenant is never visible on a property still marked vacant.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::db::DbError;

/// Unset `is_primary` on every contact of an employer, then insert the new
/// primary contact. Returns the new contact id.
pub async fn insert_primary_contact(
    pool: &PgPool,
    employer_id: i64,
    name: &str,
    role: Option<&str>,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<i64, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE employer_contacts SET is_primary = FALSE, updated_at = now() WHERE employer_id = $1 AND is_primary")
        .bind(employer_id)
        .execute(&mut *tx)
        .await?;

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO employer_contacts (employer_id, name, role, email, phone, is_primary)
         VALUES ($1, $2, $3, $4, $5, TRUE) RETURNING id",
    )
    .bind(employer_id)
    .bind(name)
    .bind(role)
    .bind(email)
    .bind(phone)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(id)
}

/// Promote an existing contact to primary, demoting its siblings in the same
/// transaction.
pub async fn promote_primary_contact(
    pool: &PgPool,
    employer_id: i64,
    contact_id: i64,
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE employer_contacts SET is_primary = FALSE, updated_at = now() WHERE employer_id = $1 AND is_primary AND id <> $2")
        .bind(employer_id)
        .bind(contact_id)
        .execute(&mut *tx)
        .await?;

    let updated = sqlx::query(
        "UPDATE employer_contacts SET is_primary = TRUE, updated_at = now() WHERE id = $1 AND employer_id = $2",
    )
    .bind(contact_id)
    .bind(employer_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(DbError::NotFound("contact", contact_id.to_string()));
    }

    tx.commit().await?;
    Ok(())
}

/// Insert a tenant and flip the parent property to rented in one transaction.
/// When the tenant is flagged primary, sibling primaries are demoted first.
#[allow(clippy::too_many_arguments)]
pub async fn insert_tenant_marking_rented(
    pool: &PgPool,
    property_id: i64,
    name: &str,
    email: Option<&str>,
    phone: Option<&str>,
    monthly_rent: Option<Decimal>,
    currency: Option<&str>,
    lease_start: Option<chrono::NaiveDate>,
    lease_end: Option<chrono::NaiveDate>,
    is_primary: bool,
) -> Result<i64, DbError> {
    let mut tx = pool.begin().await?;

    if is_primary {
        sqlx::query("UPDATE property_tenants SET is_primary = FALSE, updated_at = now() WHERE property_id = $1 AND is_primary")
            .bind(property_id)
            .execute(&mut *tx)
            .await?;
    }

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO property_tenants (property_id, name, email, phone, monthly_rent, currency, lease_start, lease_end, is_primary)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
    )
    .bind(property_id)
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(monthly_rent)
    .bind(currency)
    .bind(lease_start)
    .bind(lease_end)
    .bind(is_primary)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE properties SET is_rented = TRUE, updated_at = now() WHERE id = $1")
        .bind(property_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(id)
}

/// Record a liability payment and reduce the outstanding balance together.
pub async fn record_liability_payment(
    pool: &PgPool,
    liability_id: i64,
    amount: Decimal,
    paid_at: chrono::NaiveDate,
    note: Option<&str>,
) -> Result<i64, DbError> {
    let mut tx = pool.begin().await?;

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO liability_payments (liability_id, amount, paid_at, note)
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(liability_id)
    .bind(amount)
    .bind(paid_at)
    .bind(note)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE liabilities SET outstanding_balance = outstanding_balance - $1, updated_at = now() WHERE id = $2",
    )
    .bind(amount)
    .bind(liability_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(id)
}
