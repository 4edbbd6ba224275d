//! Person-type polymorphism. Link records (flight passengers, room guests,
//! event participants) carry a `(personType, personId)` pair; every tag is
//! resolved here, in one place, instead of per-call-site switches.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;

use crate::db::DbError;
use crate::error::{ApiError, FieldError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonType {
    Employee,
    Stakeholder,
    Employer,
    TaskHelper,
}

impl fmt::Display for PersonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PersonType::Employee => "EMPLOYEE",
            PersonType::Stakeholder => "STAKEHOLDER",
            PersonType::Employer => "EMPLOYER",
            PersonType::TaskHelper => "TASK_HELPER",
        };
        f.write_str(s)
    }
}

impl FromStr for PersonType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMPLOYEE" => Ok(PersonType::Employee),
            "STAKEHOLDER" => Ok(PersonType::Stakeholder),
            "EMPLOYER" => Ok(PersonType::Employer),
            "TASK_HELPER" => Ok(PersonType::TaskHelper),
            other => Err(format!("unknown person type '{}'", other)),
        }
    }
}

/// A manual polymorphic foreign key: the schema does not enforce it, the
/// resolver does at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRef {
    pub person_type: PersonType,
    pub person_id: i64,
}

impl PersonRef {
    /// Extract and validate a person reference from a JSON body.
    pub fn from_body(body: &Value) -> Result<Self, ApiError> {
        let type_raw = body
            .get("personType")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ApiError::missing_fields(vec![FieldError::required("personType")])
            })?;
        let person_type = type_raw.parse::<PersonType>().map_err(|msg| {
            ApiError::validation("Invalid person type", vec![FieldError::invalid("personType", msg)])
        })?;
        let person_id = body
            .get("personId")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| {
                ApiError::validation(
                    "Invalid person reference",
                    vec![FieldError::invalid("personId", "expected a numeric id")],
                )
            })?;
        Ok(Self {
            person_type,
            person_id,
        })
    }
}

/// Uniform read-side shape regardless of which table the tag points at.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub person_type: PersonType,
    pub person_id: i64,
    pub name: String,
    pub email: Option<String>,
}

#[derive(sqlx::FromRow)]
struct PersonRow {
    id: i64,
    name: String,
    email: Option<String>,
}

/// Dispatch a tagged reference to its table. `Ok(None)` means the tag was
/// valid but no row exists behind it (dangling reference).
pub async fn resolve(pool: &PgPool, person: &PersonRef) -> Result<Option<PersonSummary>, DbError> {
    let sql = match person.person_type {
        PersonType::Employee => "SELECT id, full_name AS name, email FROM employees WHERE id = $1",
        PersonType::Stakeholder => {
            "SELECT id, full_name AS name, email FROM stakeholders WHERE id = $1"
        }
        PersonType::TaskHelper => {
            "SELECT id, full_name AS name, email FROM task_helpers WHERE id = $1"
        }
        PersonType::Employer => {
            "SELECT id, COALESCE(company_name, TRIM(CONCAT(first_name, ' ', last_name))) AS name, email FROM employers WHERE id = $1"
        }
    };

    let row: Option<PersonRow> = sqlx::query_as(sql)
        .bind(person.person_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| PersonSummary {
        person_type: person.person_type,
        person_id: r.id,
        name: r.name,
        email: r.email,
    }))
}

/// Resolve a reference and fail with 404 when it dangles. Used before
/// attaching a person to a flight, room or event.
pub async fn resolve_required(
    pool: &PgPool,
    person: &PersonRef,
) -> Result<PersonSummary, ApiError> {
    match resolve(pool, person).await? {
        Some(summary) => Ok(summary),
        None => Err(ApiError::not_found("person", format!("{}:{}", person.person_type, person.person_id))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn person_type_round_trips_all_tags() {
        for tag in ["EMPLOYEE", "STAKEHOLDER", "EMPLOYER", "TASK_HELPER"] {
            let parsed = tag.parse::<PersonType>().unwrap();
            assert_eq!(parsed.to_string(), tag);
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!("CONTRACTOR".parse::<PersonType>().is_err());
        let body = json!({ "personType": "ALIEN", "personId": 3 });
        let err = PersonRef::from_body(&body).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn from_body_requires_both_halves() {
        let err = PersonRef::from_body(&json!({ "personId": 3 })).unwrap_err();
        assert_eq!(err.status_code(), 400);
        let err = PersonRef::from_body(&json!({ "personType": "EMPLOYEE" })).unwrap_err();
        assert_eq!(err.status_code(), 400);

        let ok = PersonRef::from_body(&json!({ "personType": "EMPLOYEE", "personId": 3 })).unwrap();
        assert_eq!(ok.person_type, PersonType::Employee);
        assert_eq!(ok.person_id, 3);
    }
}
