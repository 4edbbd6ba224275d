//! Email channel. Sends through a JSON HTTP provider configured by
//! EMAIL_API_URL / EMAIL_API_KEY / EMAIL_FROM.

use std::time::Duration;

use serde_json::json;

use crate::config;

#[derive(Debug)]
pub enum SendError {
    NotConfigured(&'static str),
    Provider(String),
}

pub async fn send(to: &str, subject: &str, text: &str) -> Result<(), SendError> {
    let notify = &config::config().notify;
    let url = notify
        .email_api_url
        .as_deref()
        .ok_or(SendError::NotConfigured("email provider not configured"))?;
    let key = notify
        .email_api_key
        .as_deref()
        .ok_or(SendError::NotConfigured("email provider not configured"))?;
    let from = notify.email_from.as_deref().unwrap_or("noreply@localhost");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(notify.provider_timeout_secs))
        .build()
        .map_err(|e| SendError::Provider(e.to_string()))?;

    let response = client
        .post(url)
        .bearer_auth(key)
        .json(&json!({
            "from": from,
            "to": to,
            "subject": subject,
            "text": text,
        }))
        .send()
        .await
        .map_err(|e| SendError::Provider(e.to_string()))?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(SendError::Provider(format!(
            "provider returned {}",
            response.status()
        )))
    }
}
