use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Employee row. Sensitive columns (bank, tax, ssn) are only exposed through
/// the detailed DTO, never the basic one.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub employment_type: Option<String>,
    pub status: String,
    pub salary: Option<Decimal>,
    pub currency: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub bank_name: Option<String>,
    pub tax_id: Option<String>,
    pub ssn: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmploymentStatus {
    Active,
    Inactive,
    OnLeave,
    Terminated,
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EmploymentStatus::Active => "ACTIVE",
            EmploymentStatus::Inactive => "INACTIVE",
            EmploymentStatus::OnLeave => "ON_LEAVE",
            EmploymentStatus::Terminated => "TERMINATED",
        };
        f.write_str(s)
    }
}

impl FromStr for EmploymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(EmploymentStatus::Active),
            "INACTIVE" => Ok(EmploymentStatus::Inactive),
            "ON_LEAVE" => Ok(EmploymentStatus::OnLeave),
            "TERMINATED" => Ok(EmploymentStatus::Terminated),
            other => Err(format!("unknown employee status '{}'", other)),
        }
    }
}

/// Derive the display name from its components: trimmed, joined with single
/// spaces, doubles collapsed. Recomputed server-side on every write that
/// touches a name part; never trusted verbatim from the client.
pub fn full_name(first: &str, middle: Option<&str>, last: &str) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(3);
    parts.push(first);
    if let Some(m) = middle {
        parts.push(m);
    }
    parts.push(last);

    parts
        .iter()
        .flat_map(|p| p.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_in_order() {
        assert_eq!(full_name("John", None, "Doe"), "John Doe");
        assert_eq!(full_name("John", Some("Q"), "Doe"), "John Q Doe");
    }

    #[test]
    fn full_name_trims_and_collapses_whitespace() {
        assert_eq!(full_name("  John ", None, " Doe  "), "John Doe");
        assert_eq!(full_name("John", Some("  "), "Doe"), "John Doe");
        assert_eq!(full_name("Mary  Ann", None, "Smith"), "Mary Ann Smith");
    }

    #[test]
    fn status_parses_known_values_only() {
        assert_eq!("ACTIVE".parse::<EmploymentStatus>().unwrap(), EmploymentStatus::Active);
        assert_eq!("ON_LEAVE".parse::<EmploymentStatus>().unwrap(), EmploymentStatus::OnLeave);
        assert!("RETIRED".parse::<EmploymentStatus>().is_err());
    }
}
