use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::employee::Employee;

/// Basic employee view: a fixed allow-list of fields. Sensitive columns and
/// the flat address parts never appear here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
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
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Detailed view: superset of the basic DTO, plus the grouped address object
/// and the sensitive compensation/bank fields. Only served to authorized
/// detail endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDetailedDto {
    #[serde(flatten)]
    pub base: EmployeeDto,
    pub address: AddressDto,
    pub salary: Option<Decimal>,
    pub currency: Option<String>,
    pub bank_name: Option<String>,
    pub tax_id: Option<String>,
    pub ssn: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStats {
    pub by_status: BTreeMap<String, usize>,
    pub by_department: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeListDto {
    pub total: usize,
    pub data: Vec<EmployeeDto>,
    pub stats: Option<EmployeeStats>,
    pub departments: Option<Vec<String>>,
}

pub fn to_response_dto(employee: &Employee) -> EmployeeDto {
    EmployeeDto {
        id: employee.id,
        first_name: employee.first_name.clone(),
        middle_name: employee.middle_name.clone(),
        last_name: employee.last_name.clone(),
        full_name: employee.full_name.clone(),
        email: employee.email.clone(),
        phone: employee.phone.clone(),
        department: employee.department.clone(),
        position: employee.position.clone(),
        employment_type: employee.employment_type.clone(),
        status: employee.status.clone(),
        created_at: employee.created_at.to_rfc3339(),
        updated_at: employee.updated_at.to_rfc3339(),
    }
}

pub fn to_detailed_response_dto(employee: &Employee) -> EmployeeDetailedDto {
    EmployeeDetailedDto {
        base: to_response_dto(employee),
        address: AddressDto {
            street: employee.street.clone(),
            city: employee.city.clone(),
            state: employee.state.clone(),
            postal_code: employee.postal_code.clone(),
            country: employee.country.clone(),
        },
        salary: employee.salary,
        currency: employee.currency.clone(),
        bank_name: employee.bank_name.clone(),
        tax_id: employee.tax_id.clone(),
        ssn: employee.ssn.clone(),
    }
}

/// Wrap a page of employees. `total` always equals the array length; stats
/// and the department facet are reduced over the same page when requested.
pub fn to_list_response_dto(employees: &[Employee], include_stats: bool) -> EmployeeListDto {
    let data: Vec<EmployeeDto> = employees.iter().map(to_response_dto).collect();

    let (stats, departments) = if include_stats {
        let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_department: BTreeMap<String, usize> = BTreeMap::new();
        for employee in employees {
            *by_status.entry(employee.status.clone()).or_default() += 1;
            if let Some(department) = &employee.department {
                *by_department.entry(department.clone()).or_default() += 1;
            }
        }
        let departments: Vec<String> = by_department.keys().cloned().collect();
        (
            Some(EmployeeStats {
                by_status,
                by_department,
            }),
            Some(departments),
        )
    } else {
        (None, None)
    };

    EmployeeListDto {
        total: data.len(),
        data,
        stats,
        departments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn employee(id: i64, department: Option<&str>, status: &str) -> Employee {
        Employee {
            id,
            first_name: "John".to_string(),
            middle_name: None,
            last_name: "Doe".to_string(),
            full_name: "John Doe".to_string(),
            email: format!("john{}@example.com", id),
            phone: None,
            department: department.map(|s| s.to_string()),
            position: Some("Chief of Staff".to_string()),
            employment_type: None,
            status: status.to_string(),
            salary: Some(Decimal::from(5000)),
            currency: Some("USD".to_string()),
            street: Some("1 High St".to_string()),
            city: Some("London".to_string()),
            state: None,
            postal_code: Some("N1 1AA".to_string()),
            country: Some("UK".to_string()),
            bank_name: Some("First Bank".to_string()),
            tax_id: Some("TX-1".to_string()),
            ssn: Some("000-00-0000".to_string()),
            created_at: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 8, 2, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn basic_dto_omits_sensitive_fields_but_keeps_null_keys() {
        let dto = to_response_dto(&employee(1, Some("Finance"), "ACTIVE"));
        let json = serde_json::to_value(&dto).unwrap();
        let obj = json.as_object().unwrap();

        assert!(!obj.contains_key("ssn"));
        assert!(!obj.contains_key("bankName"));
        assert!(!obj.contains_key("salary"));
        assert!(!obj.contains_key("street"));

        // null, present - consumers rely on key presence
        assert!(obj.contains_key("middleName"));
        assert!(obj["middleName"].is_null());
        assert!(obj["phone"].is_null());
    }

    #[test]
    fn dates_are_iso_8601_strings() {
        let dto = to_response_dto(&employee(1, None, "ACTIVE"));
        assert!(dto.created_at.starts_with("2026-08-01T12:00:00"));
        assert!(dto.updated_at.starts_with("2026-08-02T12:00:00"));
    }

    #[test]
    fn detailed_dto_groups_address_and_adds_sensitive_fields() {
        let dto = to_detailed_response_dto(&employee(1, None, "ACTIVE"));
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["address"]["street"], "1 High St");
        assert_eq!(json["address"]["postalCode"], "N1 1AA");
        assert!(json["address"]["state"].is_null());
        assert_eq!(json["ssn"], "000-00-0000");
        assert_eq!(json["bankName"], "First Bank");
        // still carries the basic view
        assert_eq!(json["fullName"], "John Doe");
    }

    #[test]
    fn list_dto_preserves_order_and_counts() {
        let rows = vec![
            employee(3, Some("Finance"), "ACTIVE"),
            employee(1, Some("Operations"), "ACTIVE"),
            employee(2, Some("Finance"), "INACTIVE"),
        ];
        let list = to_list_response_dto(&rows, true);
        assert_eq!(list.total, 3);
        let ids: Vec<i64> = list.data.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        let stats = list.stats.unwrap();
        assert_eq!(stats.by_status["ACTIVE"], 2);
        assert_eq!(stats.by_status["INACTIVE"], 1);
        assert_eq!(stats.by_department["Finance"], 2);
        assert_eq!(list.departments.unwrap(), vec!["Finance", "Operations"]);
    }

    #[test]
    fn list_dto_without_stats_has_null_sections() {
        let list = to_list_response_dto(&[employee(1, None, "ACTIVE")], false);
        assert!(list.stats.is_none());
        assert!(list.departments.is_none());
        let json = serde_json::to_value(&list).unwrap();
        assert!(json.as_object().unwrap().contains_key("stats"));
        assert!(json["stats"].is_null());
    }
}
