use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub purchase_value: Option<Decimal>,
    pub current_value: Decimal,
    pub currency: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Liability {
    pub id: i64,
    pub name: String,
    pub lender: Option<String>,
    pub original_amount: Decimal,
    pub outstanding_balance: Decimal,
    pub currency: String,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LiabilityPayment {
    pub id: i64,
    pub liability_id: i64,
    pub amount: Decimal,
    pub paid_at: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Dividend {
    pub id: i64,
    pub source: String,
    pub amount: Decimal,
    pub currency: String,
    pub paid_at: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Recurring outgoing payment (rent, utilities, subscriptions). Owns a
/// history of recorded payments, like liabilities do.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPayment {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub due_day: Option<i32>,
    pub active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPaymentRecord {
    pub id: i64,
    pub monthly_payment_id: i64,
    pub amount: Decimal,
    pub paid_at: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Salary {
    pub id: i64,
    pub employee_id: Option<i64>,
    pub period: String,
    pub base_salary: Decimal,
    pub housing_allowance: Decimal,
    pub transport_allowance: Decimal,
    pub other_allowances: Decimal,
    pub total_allowances: Decimal,
    pub gross_salary: Decimal,
    pub tax_deduction: Decimal,
    pub insurance_deduction: Decimal,
    pub other_deductions: Decimal,
    pub total_deductions: Decimal,
    pub net_salary: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub market_value: Option<Decimal>,
    pub currency: String,
    pub is_rented: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTenant {
    pub id: i64,
    pub property_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub monthly_rent: Option<Decimal>,
    pub currency: Option<String>,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Additive salary inputs as accepted from the client. Totals, gross and net
/// are never trusted from input: `compute` derives them server-side.
#[derive(Debug, Clone, Copy, Default)]
pub struct SalaryInputs {
    pub base_salary: Decimal,
    pub housing_allowance: Decimal,
    pub transport_allowance: Decimal,
    pub other_allowances: Decimal,
    pub tax_deduction: Decimal,
    pub insurance_deduction: Decimal,
    pub other_deductions: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalaryBreakdown {
    pub total_allowances: Decimal,
    pub gross_salary: Decimal,
    pub total_deductions: Decimal,
    pub net_salary: Decimal,
}

impl SalaryInputs {
    /// gross = base + allowances; net = gross - deductions.
    pub fn compute(&self) -> SalaryBreakdown {
        let total_allowances =
            self.housing_allowance + self.transport_allowance + self.other_allowances;
        let gross_salary = self.base_salary + total_allowances;
        let total_deductions =
            self.tax_deduction + self.insurance_deduction + self.other_deductions;
        let net_salary = gross_salary - total_deductions;
        SalaryBreakdown {
            total_allowances,
            gross_salary,
            total_deductions,
            net_salary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salary_breakdown_matches_invariant() {
        let inputs = SalaryInputs {
            base_salary: Decimal::from(5000),
            housing_allowance: Decimal::from(500),
            tax_deduction: Decimal::from(200),
            ..Default::default()
        };
        let breakdown = inputs.compute();
        assert_eq!(breakdown.total_allowances, Decimal::from(500));
        assert_eq!(breakdown.gross_salary, Decimal::from(5500));
        assert_eq!(breakdown.total_deductions, Decimal::from(200));
        assert_eq!(breakdown.net_salary, Decimal::from(5300));
    }

    #[test]
    fn zero_inputs_stay_zero() {
        let breakdown = SalaryInputs::default().compute();
        assert_eq!(breakdown.gross_salary, Decimal::ZERO);
        assert_eq!(breakdown.net_salary, Decimal::ZERO);
    }
}
