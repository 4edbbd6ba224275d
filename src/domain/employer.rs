use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Employer is polymorphic over company vs individual: the field group that
/// applies is decided by `employer_type`, the other group stays null.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employer {
    pub id: i64,
    pub employer_type: String,
    pub company_name: Option<String>,
    pub trading_name: Option<String>,
    pub registration_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profession: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmployerContact {
    pub id: i64,
    pub employer_id: i64,
    pub name: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployerType {
    Company,
    Individual,
}

impl fmt::Display for EmployerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EmployerType::Company => "COMPANY",
            EmployerType::Individual => "INDIVIDUAL",
        })
    }
}

impl FromStr for EmployerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMPANY" => Ok(EmployerType::Company),
            "INDIVIDUAL" => Ok(EmployerType::Individual),
            other => Err(format!("unknown employer type '{}'", other)),
        }
    }
}

impl Employer {
    /// Company name for companies, joined personal name for individuals.
    pub fn display_name(&self) -> String {
        match self.employer_type.parse::<EmployerType>() {
            Ok(EmployerType::Company) => self.company_name.clone().unwrap_or_default(),
            _ => {
                let first = self.first_name.as_deref().unwrap_or("");
                let last = self.last_name.as_deref().unwrap_or("");
                crate::domain::employee::full_name(first, None, last)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employer(employer_type: &str) -> Employer {
        Employer {
            id: 1,
            employer_type: employer_type.to_string(),
            company_name: Some("Acme Holdings".to_string()),
            trading_name: None,
            registration_number: None,
            first_name: Some("Jane".to_string()),
            last_name: Some("Smith".to_string()),
            profession: None,
            email: None,
            phone: None,
            status: "ACTIVE".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn display_name_follows_type_tag() {
        assert_eq!(employer("COMPANY").display_name(), "Acme Holdings");
        assert_eq!(employer("INDIVIDUAL").display_name(), "Jane Smith");
    }
}
