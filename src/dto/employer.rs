use serde::Serialize;

use crate::domain::employer::{Employer, EmployerContact, EmployerType};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDto {
    pub id: i64,
    pub name: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_primary: bool,
}

/// Company field group; populated only when `employerType == "COMPANY"`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDto {
    pub company_name: Option<String>,
    pub trading_name: Option<String>,
    pub registration_number: Option<String>,
}

/// Individual field group; populated only when `employerType == "INDIVIDUAL"`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profession: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerDto {
    pub id: i64,
    pub employer_type: String,
    pub display_name: String,
    pub company: Option<CompanyDto>,
    pub individual: Option<IndividualDto>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub contacts: Vec<ContactDto>,
    pub created_at: String,
    pub updated_at: String,
}

pub fn contact_to_dto(contact: &EmployerContact) -> ContactDto {
    ContactDto {
        id: contact.id,
        name: contact.name.clone(),
        role: contact.role.clone(),
        email: contact.email.clone(),
        phone: contact.phone.clone(),
        is_primary: contact.is_primary,
    }
}

/// Polymorphic mapping: exactly one of `company`/`individual` is populated,
/// decided by the type tag; the other stays null.
pub fn to_response_dto(employer: &Employer, contacts: &[EmployerContact]) -> EmployerDto {
    let (company, individual) = match employer.employer_type.parse::<EmployerType>() {
        Ok(EmployerType::Company) => (
            Some(CompanyDto {
                company_name: employer.company_name.clone(),
                trading_name: employer.trading_name.clone(),
                registration_number: employer.registration_number.clone(),
            }),
            None,
        ),
        _ => (
            None,
            Some(IndividualDto {
                first_name: employer.first_name.clone(),
                last_name: employer.last_name.clone(),
                profession: employer.profession.clone(),
            }),
        ),
    };

    EmployerDto {
        id: employer.id,
        employer_type: employer.employer_type.clone(),
        display_name: employer.display_name(),
        company,
        individual,
        email: employer.email.clone(),
        phone: employer.phone.clone(),
        status: employer.status.clone(),
        contacts: contacts.iter().map(contact_to_dto).collect(),
        created_at: employer.created_at.to_rfc3339(),
        updated_at: employer.updated_at.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn employer(employer_type: &str) -> Employer {
        Employer {
            id: 9,
            employer_type: employer_type.to_string(),
            company_name: Some("Acme Holdings".to_string()),
            trading_name: Some("Acme".to_string()),
            registration_number: Some("REG-77".to_string()),
            first_name: Some("Jane".to_string()),
            last_name: Some("Smith".to_string()),
            profession: Some("Architect".to_string()),
            email: None,
            phone: None,
            status: "ACTIVE".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn contact(id: i64, is_primary: bool) -> EmployerContact {
        EmployerContact {
            id,
            employer_id: 9,
            name: format!("Contact {}", id),
            role: None,
            email: None,
            phone: None,
            is_primary,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn company_employer_populates_only_company_group() {
        let dto = to_response_dto(&employer("COMPANY"), &[]);
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["company"]["companyName"], "Acme Holdings");
        assert!(json["individual"].is_null());
        assert_eq!(json["displayName"], "Acme Holdings");
    }

    #[test]
    fn individual_employer_populates_only_individual_group() {
        let dto = to_response_dto(&employer("INDIVIDUAL"), &[]);
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json["company"].is_null());
        assert_eq!(json["individual"]["profession"], "Architect");
        assert_eq!(json["displayName"], "Jane Smith");
    }

    #[test]
    fn contacts_keep_order_and_primary_flag() {
        let dto = to_response_dto(&employer("COMPANY"), &[contact(2, false), contact(5, true)]);
        assert_eq!(dto.contacts.len(), 2);
        assert_eq!(dto.contacts[0].id, 2);
        assert!(dto.contacts[1].is_primary);
    }
}
