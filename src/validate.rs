//! Request-shape validation, decoupled from business logic. Required-field
//! checks run before any persistence call and produce a deterministic,
//! input-ordered list of field errors.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::error::{ApiError, FieldError};

/// Check that every named field is present and non-blank in a JSON body.
/// Returns all failures at once so clients can fix a form in one pass.
pub fn require_fields(body: &Value, fields: &[&str]) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    for field in fields {
        let missing = match body.get(*field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if missing {
            errors.push(FieldError::required(field));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::missing_fields(errors))
    }
}

/// Parse a path id. Non-numeric input is a client error, not a crash.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim().parse::<i64>().map_err(|_| {
        ApiError::validation(
            "Invalid id",
            vec![FieldError::invalid(
                "id",
                format!("expected a numeric id, got '{}'", raw),
            )],
        )
    })
}

/// Parse an ISO-8601 date (YYYY-MM-DD). Malformed input is rejected, never
/// silently defaulted.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ApiError::validation(
            "Invalid date",
            vec![FieldError::invalid(
                field,
                format!("expected YYYY-MM-DD, got '{}'", raw),
            )],
        )
    })
}

/// Parse an RFC 3339 timestamp.
pub fn parse_datetime(field: &str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            ApiError::validation(
                "Invalid timestamp",
                vec![FieldError::invalid(
                    field,
                    format!("expected an RFC 3339 timestamp, got '{}'", raw),
                )],
            )
        })
}

/// Optional date field helper: absent or null is fine, malformed is not.
pub fn parse_optional_date(body: &Value, field: &str) -> Result<Option<NaiveDate>, ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => parse_date(field, s).map(Some),
        Some(other) => Err(ApiError::validation(
            "Invalid date",
            vec![FieldError::invalid(
                field,
                format!("expected a date string, got {}", other),
            )],
        )),
    }
}

/// Optional timestamp field helper.
pub fn parse_optional_datetime(
    body: &Value,
    field: &str,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => parse_datetime(field, s).map(Some),
        Some(other) => Err(ApiError::validation(
            "Invalid timestamp",
            vec![FieldError::invalid(
                field,
                format!("expected a timestamp string, got {}", other),
            )],
        )),
    }
}

/// Parse an optional monetary field. JSON numbers and numeric strings are
/// accepted; anything else is a 400.
pub fn parse_optional_decimal(
    body: &Value,
    field: &str,
) -> Result<Option<rust_decimal::Decimal>, ApiError> {
    use std::str::FromStr;
    let raw = match body.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => {
            return Err(ApiError::validation(
                "Invalid amount",
                vec![FieldError::invalid(
                    field,
                    format!("expected a number, got {}", other),
                )],
            ))
        }
    };
    rust_decimal::Decimal::from_str(&raw).map(Some).map_err(|_| {
        ApiError::validation(
            "Invalid amount",
            vec![FieldError::invalid(
                field,
                format!("expected a number, got '{}'", raw),
            )],
        )
    })
}

/// Required monetary field: absent is a validation error.
pub fn parse_decimal(body: &Value, field: &str) -> Result<rust_decimal::Decimal, ApiError> {
    parse_optional_decimal(body, field)?
        .ok_or_else(|| ApiError::missing_fields(vec![FieldError::required(field)]))
}

/// Monetary field defaulting to zero when absent.
pub fn parse_decimal_or_zero(body: &Value, field: &str) -> Result<rust_decimal::Decimal, ApiError> {
    Ok(parse_optional_decimal(body, field)?.unwrap_or(rust_decimal::Decimal::ZERO))
}

/// Optional integer reference field (foreign ids and the like). Only a JSON
/// integer passes; strings, fractions and other types are a 400, never
/// silently dropped.
pub fn parse_optional_i64(body: &Value, field: &str) -> Result<Option<i64>, ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) if n.is_i64() => Ok(n.as_i64()),
        Some(other) => Err(ApiError::validation(
            "Invalid id",
            vec![FieldError::invalid(
                field,
                format!("expected an integer, got {}", other),
            )],
        )),
    }
}

/// Optional string field, with the same strictness as the date and amount
/// helpers: a wrong-typed value is a 400, not treated as absent.
pub fn parse_optional_str(body: &Value, field: &str) -> Result<Option<String>, ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.to_string())),
        Some(other) => Err(ApiError::validation(
            "Invalid value",
            vec![FieldError::invalid(
                field,
                format!("expected a string, got {}", other),
            )],
        )),
    }
}

pub fn opt_str(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

pub fn str_or_default(body: &Value, field: &str, default: &str) -> String {
    opt_str(body, field).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn require_fields_reports_all_missing_in_order() {
        let body = json!({ "lastName": "Doe", "email": "  " });
        let err = require_fields(&body, &["firstName", "lastName", "email"]).unwrap_err();
        let json = err.to_json();
        let errors = json["validationErrors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "firstName");
        assert_eq!(errors[1]["field"], "email");
    }

    #[test]
    fn require_fields_accepts_non_string_values() {
        let body = json!({ "title": "standup", "date": "2026-08-23", "startTime": "09:00" });
        assert!(require_fields(&body, &["title", "date", "startTime"]).is_ok());
    }

    #[test]
    fn parse_id_rejects_non_numeric() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id(" 7 ").unwrap(), 7);
        let err = parse_id("abc").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn parse_date_rejects_malformed() {
        assert!(parse_date("date", "2026-08-23").is_ok());
        assert_eq!(parse_date("date", "23/08/2026").unwrap_err().status_code(), 400);
        assert_eq!(parse_date("date", "2026-13-99").unwrap_err().status_code(), 400);
    }

    #[test]
    fn decimal_accepts_numbers_and_numeric_strings() {
        use rust_decimal::Decimal;
        let body = json!({ "amount": 5000.5, "asText": "120.25", "bad": true });
        assert_eq!(
            parse_decimal(&body, "amount").unwrap(),
            Decimal::new(50005, 1)
        );
        assert_eq!(
            parse_decimal(&body, "asText").unwrap(),
            Decimal::new(12025, 2)
        );
        assert_eq!(parse_decimal_or_zero(&body, "missing").unwrap(), Decimal::ZERO);
        assert_eq!(parse_optional_decimal(&body, "bad").unwrap_err().status_code(), 400);
        assert_eq!(parse_decimal(&body, "missing").unwrap_err().status_code(), 400);
    }

    #[test]
    fn optional_i64_rejects_strings_and_fractions() {
        let body = json!({ "relatedId": 7, "asText": "7", "fractional": 3.7, "wrong": "abc" });
        assert_eq!(parse_optional_i64(&body, "relatedId").unwrap(), Some(7));
        assert_eq!(parse_optional_i64(&body, "missing").unwrap(), None);
        assert_eq!(parse_optional_i64(&body, "asText").unwrap_err().status_code(), 400);
        assert_eq!(parse_optional_i64(&body, "fractional").unwrap_err().status_code(), 400);
        assert_eq!(parse_optional_i64(&body, "wrong").unwrap_err().status_code(), 400);
    }

    #[test]
    fn optional_str_rejects_wrong_types() {
        let body = json!({ "middleName": "Q", "bad": 123 });
        assert_eq!(parse_optional_str(&body, "middleName").unwrap().as_deref(), Some("Q"));
        assert_eq!(parse_optional_str(&body, "missing").unwrap(), None);
        assert_eq!(parse_optional_str(&body, "bad").unwrap_err().status_code(), 400);
    }

    #[test]
    fn optional_date_absent_is_none_malformed_is_error() {
        let body = json!({ "endDate": "nope" });
        assert_eq!(parse_optional_date(&body, "startDate").unwrap(), None);
        assert!(parse_optional_date(&body, "endDate").is_err());
    }
}
