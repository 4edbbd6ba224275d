//! Outbound notification dispatch. Two channels exist, email and WhatsApp;
//! each attempt reports its own outcome and a channel failure never fails the
//! request that triggered it. An unconfigured channel is reported as skipped.

pub mod email;
pub mod whatsapp;

use serde::Serialize;
use serde_json::Value;

use crate::domain::schedule::Meeting;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOutcome {
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Sent,
    Skipped,
    Failed,
}

impl ChannelOutcome {
    pub fn sent() -> Self {
        Self { status: OutcomeStatus::Sent, detail: None }
    }

    pub fn skipped(detail: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Skipped,
            detail: Some(detail.into()),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelResults {
    pub email: ChannelOutcome,
    pub whatsapp: ChannelOutcome,
}

/// Render a travel-request aggregate into plain itinerary text. Sections
/// appear only when the request has rows for them.
pub fn itinerary_text(aggregate: &Value) -> String {
    let mut out = String::new();
    let request_number = aggregate
        .get("requestNumber")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    out.push_str(&format!("Itinerary for travel request {}\n", request_number));

    if let Some(purpose) = aggregate.get("purpose").and_then(|v| v.as_str()) {
        out.push_str(&format!("Purpose: {}\n", purpose));
    }

    if let Some(destinations) = aggregate.get("destinations").and_then(|v| v.as_array()) {
        for d in destinations {
            let city = d.get("city").and_then(|v| v.as_str()).unwrap_or("?");
            let country = d.get("country").and_then(|v| v.as_str()).unwrap_or("?");
            out.push_str(&format!("Destination: {}, {}\n", city, country));
        }
    }
    if let Some(flights) = aggregate.get("flights").and_then(|v| v.as_array()) {
        for f in flights {
            let airline = f.get("airline").and_then(|v| v.as_str()).unwrap_or("?");
            let number = f.get("flightNumber").and_then(|v| v.as_str()).unwrap_or("?");
            let from = f.get("departureAirport").and_then(|v| v.as_str()).unwrap_or("?");
            let to = f.get("arrivalAirport").and_then(|v| v.as_str()).unwrap_or("?");
            out.push_str(&format!("Flight: {} {} {} -> {}\n", airline, number, from, to));
        }
    }
    if let Some(hotels) = aggregate.get("hotels").and_then(|v| v.as_array()) {
        for h in hotels {
            let name = h.get("name").and_then(|v| v.as_str()).unwrap_or("?");
            let city = h.get("city").and_then(|v| v.as_str()).unwrap_or("?");
            out.push_str(&format!("Hotel: {} ({})\n", name, city));
        }
    }
    if let Some(cars) = aggregate.get("rentalCars").and_then(|v| v.as_array()) {
        for c in cars {
            let company = c.get("company").and_then(|v| v.as_str()).unwrap_or("?");
            out.push_str(&format!("Rental car: {}\n", company));
        }
    }
    if let Some(events) = aggregate.get("events").and_then(|v| v.as_array()) {
        for e in events {
            let title = e.get("title").and_then(|v| v.as_str()).unwrap_or("?");
            out.push_str(&format!("Event: {}\n", title));
        }
    }
    out
}

/// Render a meeting reminder.
pub fn reminder_text(meeting: &Meeting) -> String {
    let mut out = format!(
        "Reminder: {} on {} at {}",
        meeting.title, meeting.date, meeting.start_time
    );
    if let Some(location) = &meeting.location {
        out.push_str(&format!(" ({})", location));
    }
    out.push('\n');
    if let Some(agenda) = &meeting.agenda {
        out.push_str(&format!("Agenda: {}\n", agenda));
    }
    out
}

async fn dispatch(
    subject: &str,
    text: &str,
    recipient_email: Option<&str>,
    recipient_phone: Option<&str>,
) -> ChannelResults {
    let email = match recipient_email {
        Some(to) => match email::send(to, subject, text).await {
            Ok(()) => ChannelOutcome::sent(),
            Err(email::SendError::NotConfigured(what)) => ChannelOutcome::skipped(what),
            Err(email::SendError::Provider(detail)) => {
                tracing::warn!("email dispatch failed: {}", detail);
                ChannelOutcome::failed(detail)
            }
        },
        None => ChannelOutcome::skipped("no recipient email"),
    };

    let whatsapp = match recipient_phone {
        Some(to) => match whatsapp::send(to, text).await {
            Ok(()) => ChannelOutcome::sent(),
            Err(whatsapp::SendError::NotConfigured(what)) => ChannelOutcome::skipped(what),
            Err(whatsapp::SendError::Provider(detail)) => {
                tracing::warn!("whatsapp dispatch failed: {}", detail);
                ChannelOutcome::failed(detail)
            }
        },
        None => ChannelOutcome::skipped("no recipient phone"),
    };

    ChannelResults { email, whatsapp }
}

pub async fn send_itinerary(
    aggregate: &Value,
    recipient_email: Option<&str>,
    recipient_phone: Option<&str>,
) -> ChannelResults {
    let subject = format!(
        "Travel itinerary {}",
        aggregate
            .get("requestNumber")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
    );
    let text = itinerary_text(aggregate);
    dispatch(&subject, &text, recipient_email, recipient_phone).await
}

pub async fn send_meeting_reminder(
    meeting: &Meeting,
    recipient_email: Option<&str>,
    recipient_phone: Option<&str>,
) -> ChannelResults {
    let subject = format!("Meeting reminder: {}", meeting.title);
    let text = reminder_text(meeting);
    dispatch(&subject, &text, recipient_email, recipient_phone).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use serde_json::json;

    #[test]
    fn itinerary_lists_only_present_sections() {
        let aggregate = json!({
            "requestNumber": "TR-1724400000000",
            "purpose": "Board meeting",
            "destinations": [{ "city": "Zurich", "country": "CH" }],
            "flights": [],
            "hotels": [{ "name": "Baur au Lac", "city": "Zurich" }],
        });
        let text = itinerary_text(&aggregate);
        assert!(text.contains("TR-1724400000000"));
        assert!(text.contains("Destination: Zurich, CH"));
        assert!(text.contains("Hotel: Baur au Lac (Zurich)"));
        assert!(!text.contains("Flight:"));
        assert!(!text.contains("Rental car:"));
    }

    #[test]
    fn reminder_includes_location_and_agenda_when_set() {
        let now = Utc::now();
        let meeting = Meeting {
            id: 1,
            title: "Quarterly review".into(),
            date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            start_time: "10:00".into(),
            end_time: None,
            location: Some("Library".into()),
            agenda: Some("Budget".into()),
            status: "SCHEDULED".into(),
            related_to: None,
            related_id: None,
            created_at: now,
            updated_at: now,
        };
        let text = reminder_text(&meeting);
        assert!(text.contains("Quarterly review"));
        assert!(text.contains("(Library)"));
        assert!(text.contains("Agenda: Budget"));
    }

    #[tokio::test]
    async fn unconfigured_channels_are_skipped_not_failed() {
        // No provider credentials in the unit-test environment.
        if std::env::var("EMAIL_API_URL").is_ok() || std::env::var("WHATSAPP_ACCOUNT_SID").is_ok() {
            return;
        }
        let results = dispatch("s", "t", Some("a@b.c"), Some("+15550001")).await;
        assert_eq!(results.email.status, OutcomeStatus::Skipped);
        assert_eq!(results.whatsapp.status, OutcomeStatus::Skipped);
    }

    #[tokio::test]
    async fn missing_recipients_are_skipped() {
        let results = dispatch("s", "t", None, None).await;
        assert_eq!(results.email.status, OutcomeStatus::Skipped);
        assert_eq!(results.whatsapp.status, OutcomeStatus::Skipped);
    }
}
