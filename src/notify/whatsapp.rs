//! WhatsApp channel over the Twilio messages API, configured by
//! WHATSAPP_ACCOUNT_SID / WHATSAPP_AUTH_TOKEN / WHATSAPP_FROM.

use std::time::Duration;

use crate::config;

#[derive(Debug)]
pub enum SendError {
    NotConfigured(&'static str),
    Provider(String),
}

pub async fn send(to: &str, text: &str) -> Result<(), SendError> {
    let notify = &config::config().notify;
    let sid = notify
        .whatsapp_account_sid
        .as_deref()
        .ok_or(SendError::NotConfigured("whatsapp provider not configured"))?;
    let token = notify
        .whatsapp_auth_token
        .as_deref()
        .ok_or(SendError::NotConfigured("whatsapp provider not configured"))?;
    let from = notify
        .whatsapp_from
        .as_deref()
        .ok_or(SendError::NotConfigured("whatsapp sender not configured"))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(notify.provider_timeout_secs))
        .build()
        .map_err(|e| SendError::Provider(e.to_string()))?;

    let url = format!(
        "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
        sid
    );
    let params = [
        ("From", format!("whatsapp:{}", from)),
        ("To", format!("whatsapp:{}", to)),
        ("Body", text.to_string()),
    ];

    let response = client
        .post(&url)
        .basic_auth(sid, Some(token))
        .form(&params)
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
