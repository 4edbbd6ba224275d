//! Cookie-session verification. Two independent sessions exist: a full
//! administrative one and a finance-scoped one, each signed with its own
//! secret. A request may carry zero, one or both cookies; the admin session
//! is always checked first and wins.

use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;

pub const ADMIN_COOKIE: &str = "icms_admin_session";
pub const FINANCE_COOKIE: &str = "icms_finance_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Full,
    Finance,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Full => "full",
            AccessLevel::Finance => "finance",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(subject: impl Into<String>) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.session_expiry_hours;
        Self {
            sub: subject.into(),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Sign a session token. Issuance normally lives with the identity provider;
/// this exists for local tooling and tests.
pub fn issue_session(secret: &str, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        &Claims::new(subject),
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn verify_session(secret: &str, token: &str) -> Option<Claims> {
    if secret.is_empty() {
        return None;
    }
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// Pull one cookie value out of a Cookie header line.
fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then_some(v)
    })
}

/// Determine the caller's access tier from request headers. Admin first,
/// then finance; both verifications are independent.
pub fn authenticate(headers: &HeaderMap) -> Option<AccessLevel> {
    let cookie_header = headers.get("cookie").and_then(|v| v.to_str().ok())?;
    let security = &config::config().security;

    if let Some(token) = cookie_value(cookie_header, ADMIN_COOKIE) {
        if verify_session(&security.admin_session_secret, token).is_some() {
            return Some(AccessLevel::Full);
        }
    }
    if let Some(token) = cookie_value(cookie_header, FINANCE_COOKIE) {
        if verify_session(&security.finance_session_secret, token).is_some() {
            return Some(AccessLevel::Finance);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_parsing_handles_multiple_pairs() {
        let line = "theme=dark; icms_admin_session=abc.def.ghi; other=1";
        assert_eq!(cookie_value(line, ADMIN_COOKIE), Some("abc.def.ghi"));
        assert_eq!(cookie_value(line, FINANCE_COOKIE), None);
        assert_eq!(cookie_value(line, "theme"), Some("dark"));
    }

    #[test]
    fn empty_secret_never_verifies() {
        assert!(verify_session("", "whatever").is_none());
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let token = issue_session("unit-test-secret", "admin").unwrap();
        let claims = verify_session("unit-test-secret", &token).unwrap();
        assert_eq!(claims.sub, "admin");
        // wrong secret must fail
        assert!(verify_session("other-secret", &token).is_none());
    }
}
