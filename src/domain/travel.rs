use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trip lifecycle. Linear forward progression, with cancellation reachable
/// from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelStatus {
    Request,
    Planning,
    Confirming,
    Executing,
    Completed,
    Cancelled,
}

impl TravelStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TravelStatus::Completed | TravelStatus::Cancelled)
    }

    fn next(&self) -> Option<TravelStatus> {
        match self {
            TravelStatus::Request => Some(TravelStatus::Planning),
            TravelStatus::Planning => Some(TravelStatus::Confirming),
            TravelStatus::Confirming => Some(TravelStatus::Executing),
            TravelStatus::Executing => Some(TravelStatus::Completed),
            _ => None,
        }
    }

    /// The only legal moves are one step forward or to CANCELLED from a
    /// non-terminal state.
    pub fn can_transition(&self, to: TravelStatus) -> bool {
        if to == TravelStatus::Cancelled {
            return !self.is_terminal();
        }
        self.next() == Some(to)
    }
}

impl fmt::Display for TravelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TravelStatus::Request => "REQUEST",
            TravelStatus::Planning => "PLANNING",
            TravelStatus::Confirming => "CONFIRMING",
            TravelStatus::Executing => "EXECUTING",
            TravelStatus::Completed => "COMPLETED",
            TravelStatus::Cancelled => "CANCELLED",
        })
    }
}

impl FromStr for TravelStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REQUEST" => Ok(TravelStatus::Request),
            "PLANNING" => Ok(TravelStatus::Planning),
            "CONFIRMING" => Ok(TravelStatus::Confirming),
            "EXECUTING" => Ok(TravelStatus::Executing),
            "COMPLETED" => Ok(TravelStatus::Completed),
            "CANCELLED" => Ok(TravelStatus::Cancelled),
            other => Err(format!("unknown travel status '{}'", other)),
        }
    }
}

/// Request numbers are minted once at creation and immutable afterwards.
pub fn generate_request_number(now: DateTime<Utc>) -> String {
    format!("TR-{}", now.timestamp_millis())
}

/// Aggregate root for a trip; owns every nested travel component.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TravelRequest {
    pub id: i64,
    pub request_number: String,
    pub title: String,
    pub requester_name: String,
    pub purpose: Option<String>,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: i64,
    pub travel_request_id: i64,
    pub city: String,
    pub country: Option<String>,
    pub arrival_date: Option<NaiveDate>,
    pub departure_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: i64,
    pub travel_request_id: i64,
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub booking_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FlightPassenger {
    pub id: i64,
    pub flight_id: i64,
    pub person_type: String,
    pub person_id: i64,
    pub seat: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: i64,
    pub travel_request_id: i64,
    pub name: String,
    pub city: Option<String>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub booking_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HotelRoom {
    pub id: i64,
    pub hotel_id: i64,
    pub room_type: Option<String>,
    pub person_type: Option<String>,
    pub person_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RentalCar {
    pub id: i64,
    pub travel_request_id: i64,
    pub company: Option<String>,
    pub car_model: Option<String>,
    pub pickup_location: String,
    pub dropoff_location: Option<String>,
    pub pickup_time: Option<DateTime<Utc>>,
    pub dropoff_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TravelEvent {
    pub id: i64,
    pub travel_request_id: i64,
    pub title: String,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventParticipant {
    pub id: i64,
    pub event_id: i64,
    pub person_type: String,
    pub person_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventAttachment {
    pub id: i64,
    pub event_id: i64,
    pub file_name: String,
    pub content_type: Option<String>,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PrivateJet {
    pub id: i64,
    pub travel_request_id: i64,
    pub operator: Option<String>,
    pub tail_number: Option<String>,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub booking_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Train {
    pub id: i64,
    pub travel_request_id: i64,
    pub operator: Option<String>,
    pub train_number: Option<String>,
    pub departure_station: String,
    pub arrival_station: String,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub booking_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmbassyService {
    pub id: i64,
    pub travel_request_id: i64,
    pub country: String,
    pub service_type: Option<String>,
    pub appointment_at: Option<DateTime<Utc>>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MeetAssistService {
    pub id: i64,
    pub travel_request_id: i64,
    pub airport: String,
    pub service_type: Option<String>,
    pub provider: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Log entry for a message sent about a trip. Recipients are person
/// references, resolved like passengers and participants.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    pub id: i64,
    pub travel_request_id: i64,
    pub channel: String,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationRecipient {
    pub id: i64,
    pub communication_id: i64,
    pub person_type: String,
    pub person_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_moves_one_step_forward() {
        assert!(TravelStatus::Request.can_transition(TravelStatus::Planning));
        assert!(TravelStatus::Planning.can_transition(TravelStatus::Confirming));
        assert!(TravelStatus::Confirming.can_transition(TravelStatus::Executing));
        assert!(TravelStatus::Executing.can_transition(TravelStatus::Completed));
    }

    #[test]
    fn lifecycle_rejects_skips_and_reversals() {
        assert!(!TravelStatus::Request.can_transition(TravelStatus::Confirming));
        assert!(!TravelStatus::Request.can_transition(TravelStatus::Completed));
        assert!(!TravelStatus::Executing.can_transition(TravelStatus::Planning));
        assert!(!TravelStatus::Planning.can_transition(TravelStatus::Planning));
    }

    #[test]
    fn cancellation_only_from_non_terminal() {
        assert!(TravelStatus::Request.can_transition(TravelStatus::Cancelled));
        assert!(TravelStatus::Executing.can_transition(TravelStatus::Cancelled));
        assert!(!TravelStatus::Completed.can_transition(TravelStatus::Cancelled));
        assert!(!TravelStatus::Cancelled.can_transition(TravelStatus::Cancelled));
        assert!(!TravelStatus::Completed.can_transition(TravelStatus::Completed));
    }

    #[test]
    fn request_numbers_carry_creation_millis() {
        let now = Utc::now();
        let number = generate_request_number(now);
        assert_eq!(number, format!("TR-{}", now.timestamp_millis()));
    }
}
