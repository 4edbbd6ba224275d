use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{PgPool, QueryBuilder};

use crate::db::Database;
use crate::domain::person::{self, PersonRef};
use crate::domain::travel::{
    self, Communication, CommunicationRecipient, Destination, EmbassyService, EventAttachment,
    EventParticipant, Flight, FlightPassenger, Hotel, HotelRoom, MeetAssistService, PrivateJet,
    RentalCar, Train, TravelEvent, TravelRequest, TravelStatus,
};
use crate::error::{ApiError, FieldError};
use crate::validate::{
    opt_str, parse_id, parse_optional_date, parse_optional_datetime, require_fields,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// GET /api/travel-requests
pub async fn list(Query(query): Query<ListQuery>) -> Result<Json<Vec<TravelRequest>>, ApiError> {
    let pool = Database::pool().await?;

    let mut qb = QueryBuilder::new("SELECT * FROM travel_requests WHERE 1=1");
    if let Some(status) = &query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    qb.push(" ORDER BY id DESC");

    let rows: Vec<TravelRequest> = qb.build_query_as().fetch_all(&pool).await?;
    Ok(Json(rows))
}

/// POST /api/travel-requests - mints the immutable request number
pub async fn create(Json(body): Json<Value>) -> Result<Response, ApiError> {
    require_fields(&body, &["title", "requesterName"])?;

    let start_date = parse_optional_date(&body, "startDate")?;
    let end_date = parse_optional_date(&body, "endDate")?;
    let request_number = travel::generate_request_number(Utc::now());

    let pool = Database::pool().await?;
    let row: TravelRequest = sqlx::query_as(
        "INSERT INTO travel_requests (request_number, title, requester_name, purpose, status, start_date, end_date, notes)
         VALUES ($1, $2, $3, $4, 'REQUEST', $5, $6, $7) RETURNING *",
    )
    .bind(&request_number)
    .bind(opt_str(&body, "title"))
    .bind(opt_str(&body, "requesterName"))
    .bind(opt_str(&body, "purpose"))
    .bind(start_date)
    .bind(end_date)
    .bind(opt_str(&body, "notes"))
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(row)).into_response())
}

pub(crate) async fn fetch_request(pool: &PgPool, id: i64) -> Result<TravelRequest, ApiError> {
    sqlx::query_as::<_, TravelRequest>("SELECT * FROM travel_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("travel request", id))
}

/// Load every nested collection of the aggregate in one pass.
pub(crate) async fn load_aggregate(pool: &PgPool, request: &TravelRequest) -> Result<Value, ApiError> {
    let destinations: Vec<Destination> = sqlx::query_as(
        "SELECT * FROM travel_destinations WHERE travel_request_id = $1 ORDER BY id",
    )
    .bind(request.id)
    .fetch_all(pool)
    .await?;

    let flights: Vec<Flight> =
        sqlx::query_as("SELECT * FROM flights WHERE travel_request_id = $1 ORDER BY id")
            .bind(request.id)
            .fetch_all(pool)
            .await?;
    let passengers: Vec<FlightPassenger> = sqlx::query_as(
        "SELECT fp.* FROM flight_passengers fp
         JOIN flights f ON fp.flight_id = f.id
         WHERE f.travel_request_id = $1 ORDER BY fp.id",
    )
    .bind(request.id)
    .fetch_all(pool)
    .await?;

    let hotels: Vec<Hotel> =
        sqlx::query_as("SELECT * FROM hotels WHERE travel_request_id = $1 ORDER BY id")
            .bind(request.id)
            .fetch_all(pool)
            .await?;
    let rooms: Vec<HotelRoom> = sqlx::query_as(
        "SELECT hr.* FROM hotel_rooms hr
         JOIN hotels h ON hr.hotel_id = h.id
         WHERE h.travel_request_id = $1 ORDER BY hr.id",
    )
    .bind(request.id)
    .fetch_all(pool)
    .await?;

    let cars: Vec<RentalCar> =
        sqlx::query_as("SELECT * FROM rental_cars WHERE travel_request_id = $1 ORDER BY id")
            .bind(request.id)
            .fetch_all(pool)
            .await?;

    let events: Vec<TravelEvent> =
        sqlx::query_as("SELECT * FROM travel_events WHERE travel_request_id = $1 ORDER BY id")
            .bind(request.id)
            .fetch_all(pool)
            .await?;
    let participants: Vec<EventParticipant> = sqlx::query_as(
        "SELECT ep.* FROM event_participants ep
         JOIN travel_events e ON ep.event_id = e.id
         WHERE e.travel_request_id = $1 ORDER BY ep.id",
    )
    .bind(request.id)
    .fetch_all(pool)
    .await?;
    let attachments: Vec<EventAttachment> = sqlx::query_as(
        "SELECT ea.* FROM event_attachments ea
         JOIN travel_events e ON ea.event_id = e.id
         WHERE e.travel_request_id = $1 ORDER BY ea.id",
    )
    .bind(request.id)
    .fetch_all(pool)
    .await?;

    let jets: Vec<PrivateJet> =
        sqlx::query_as("SELECT * FROM private_jets WHERE travel_request_id = $1 ORDER BY id")
            .bind(request.id)
            .fetch_all(pool)
            .await?;
    let trains: Vec<Train> =
        sqlx::query_as("SELECT * FROM trains WHERE travel_request_id = $1 ORDER BY id")
            .bind(request.id)
            .fetch_all(pool)
            .await?;
    let embassy: Vec<EmbassyService> =
        sqlx::query_as("SELECT * FROM embassy_services WHERE travel_request_id = $1 ORDER BY id")
            .bind(request.id)
            .fetch_all(pool)
            .await?;
    let meet_assist: Vec<MeetAssistService> = sqlx::query_as(
        "SELECT * FROM meet_assist_services WHERE travel_request_id = $1 ORDER BY id",
    )
    .bind(request.id)
    .fetch_all(pool)
    .await?;

    let communications: Vec<Communication> = sqlx::query_as(
        "SELECT * FROM travel_communications WHERE travel_request_id = $1 ORDER BY id",
    )
    .bind(request.id)
    .fetch_all(pool)
    .await?;
    let recipients: Vec<CommunicationRecipient> = sqlx::query_as(
        "SELECT cr.* FROM communication_recipients cr
         JOIN travel_communications c ON cr.communication_id = c.id
         WHERE c.travel_request_id = $1 ORDER BY cr.id",
    )
    .bind(request.id)
    .fetch_all(pool)
    .await?;

    let flights_json: Vec<Value> = flights
        .iter()
        .map(|f| {
            let mut v = json!(f);
            v["passengers"] = json!(passengers
                .iter()
                .filter(|p| p.flight_id == f.id)
                .collect::<Vec<_>>());
            v
        })
        .collect();

    let hotels_json: Vec<Value> = hotels
        .iter()
        .map(|h| {
            let mut v = json!(h);
            v["rooms"] = json!(rooms.iter().filter(|r| r.hotel_id == h.id).collect::<Vec<_>>());
            v
        })
        .collect();

    let events_json: Vec<Value> = events
        .iter()
        .map(|e| {
            let mut v = json!(e);
            v["participants"] = json!(participants
                .iter()
                .filter(|p| p.event_id == e.id)
                .collect::<Vec<_>>());
            v["attachments"] = json!(attachments
                .iter()
                .filter(|a| a.event_id == e.id)
                .collect::<Vec<_>>());
            v
        })
        .collect();

    let communications_json: Vec<Value> = communications
        .iter()
        .map(|c| {
            let mut v = json!(c);
            v["recipients"] = json!(recipients
                .iter()
                .filter(|r| r.communication_id == c.id)
                .collect::<Vec<_>>());
            v
        })
        .collect();

    let mut body = json!(request);
    body["destinations"] = json!(destinations);
    body["flights"] = json!(flights_json);
    body["hotels"] = json!(hotels_json);
    body["privateJets"] = json!(jets);
    body["trains"] = json!(trains);
    body["rentalCars"] = json!(cars);
    body["events"] = json!(events_json);
    body["embassyServices"] = json!(embassy);
    body["meetAssist"] = json!(meet_assist);
    body["communications"] = json!(communications_json);
    Ok(body)
}

/// GET /api/travel-requests/:id - the full aggregate
pub async fn get(Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    let request = fetch_request(&pool, id).await?;
    Ok(Json(load_aggregate(&pool, &request).await?))
}

/// PATCH /api/travel-requests/:id - descriptive fields only; the request
/// number is immutable and status moves only via the transition endpoint
pub async fn patch(Path(id): Path<String>, Json(body): Json<Value>) -> Result<Json<TravelRequest>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    let existing = fetch_request(&pool, id).await?;

    if let Some(number) = opt_str(&body, "requestNumber") {
        if number != existing.request_number {
            return Err(ApiError::domain("requestNumber is immutable"));
        }
    }
    if body.get("status").is_some() {
        return Err(ApiError::domain(
            "status changes must go through the status endpoint",
        ));
    }

    let start_date = match body.get("startDate") {
        None => existing.start_date,
        Some(_) => parse_optional_date(&body, "startDate")?,
    };
    let end_date = match body.get("endDate") {
        None => existing.end_date,
        Some(_) => parse_optional_date(&body, "endDate")?,
    };

    let row: TravelRequest = sqlx::query_as(
        "UPDATE travel_requests SET title = $1, requester_name = $2, purpose = $3,
            start_date = $4, end_date = $5, notes = $6, updated_at = now()
         WHERE id = $7 RETURNING *",
    )
    .bind(opt_str(&body, "title").unwrap_or(existing.title))
    .bind(opt_str(&body, "requesterName").unwrap_or(existing.requester_name))
    .bind(opt_str(&body, "purpose").or(existing.purpose))
    .bind(start_date)
    .bind(end_date)
    .bind(opt_str(&body, "notes").or(existing.notes))
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(row))
}

/// PUT /api/travel-requests/:id/status - lifecycle transition, 422 on an
/// illegal move
pub async fn put_status(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<TravelRequest>, ApiError> {
    let id = parse_id(&id)?;
    require_fields(&body, &["status"])?;

    let target_raw = opt_str(&body, "status").unwrap_or_default();
    let target = target_raw.parse::<TravelStatus>().map_err(|msg| {
        ApiError::validation("Invalid status", vec![FieldError::invalid("status", msg)])
    })?;

    let pool = Database::pool().await?;
    let existing = fetch_request(&pool, id).await?;
    let current = existing
        .status
        .parse::<TravelStatus>()
        .map_err(ApiError::internal)?;

    if !current.can_transition(target) {
        return Err(ApiError::domain(format!(
            "cannot move travel request from {} to {}",
            current, target
        )));
    }

    let row: TravelRequest = sqlx::query_as(
        "UPDATE travel_requests SET status = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(target.to_string())
    .bind(id)
    .fetch_one(&pool)
    .await?;
    Ok(Json(row))
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub soft: Option<bool>,
}

/// DELETE /api/travel-requests/:id - `?soft=true` cancels instead of removing
pub async fn delete(
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;

    if query.soft.unwrap_or(false) {
        let existing = fetch_request(&pool, id).await?;
        let current = existing
            .status
            .parse::<TravelStatus>()
            .map_err(ApiError::internal)?;
        if !current.can_transition(TravelStatus::Cancelled) {
            return Err(ApiError::domain(format!(
                "cannot cancel a {} travel request",
                current
            )));
        }
        sqlx::query("UPDATE travel_requests SET status = 'CANCELLED', updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await?;
        Ok(Json(json!({ "message": "Travel request cancelled", "id": id })))
    } else {
        let deleted = sqlx::query("DELETE FROM travel_requests WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(ApiError::not_found("travel request", id));
        }
        Ok(Json(json!({ "message": "Travel request deleted", "id": id })))
    }
}

/// GET /api/travel-requests/:id/destinations
pub async fn list_destinations(Path(id): Path<String>) -> Result<Json<Vec<Destination>>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let rows: Vec<Destination> = sqlx::query_as(
        "SELECT * FROM travel_destinations WHERE travel_request_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;
    Ok(Json(rows))
}

/// POST /api/travel-requests/:id/destinations
pub async fn create_destination(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    require_fields(&body, &["city"])?;

    let arrival_date = parse_optional_date(&body, "arrivalDate")?;
    let departure_date = parse_optional_date(&body, "departureDate")?;

    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let row: Destination = sqlx::query_as(
        "INSERT INTO travel_destinations (travel_request_id, city, country, arrival_date, departure_date)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(id)
    .bind(opt_str(&body, "city"))
    .bind(opt_str(&body, "country"))
    .bind(arrival_date)
    .bind(departure_date)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(row)).into_response())
}

/// GET /api/travel-requests/:id/flights
pub async fn list_flights(Path(id): Path<String>) -> Result<Json<Vec<Flight>>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let rows: Vec<Flight> =
        sqlx::query_as("SELECT * FROM flights WHERE travel_request_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(&pool)
            .await?;
    Ok(Json(rows))
}

/// POST /api/travel-requests/:id/flights - passengers are person references
/// resolved before anything is written
pub async fn create_flight(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    require_fields(&body, &["departureAirport", "arrivalAirport"])?;

    let departure_time = parse_optional_datetime(&body, "departureTime")?;
    let arrival_time = parse_optional_datetime(&body, "arrivalTime")?;

    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    // Validate the whole passenger list up front; a dangling reference fails
    // the request before the flight row exists.
    let mut passengers: Vec<(PersonRef, Option<String>)> = Vec::new();
    if let Some(list) = body.get("passengers").and_then(|v| v.as_array()) {
        for entry in list {
            let person = PersonRef::from_body(entry)?;
            person::resolve_required(&pool, &person).await?;
            passengers.push((person, opt_str(entry, "seat")));
        }
    }

    let flight: Flight = sqlx::query_as(
        "INSERT INTO flights (travel_request_id, airline, flight_number, departure_airport,
            arrival_airport, departure_time, arrival_time, booking_reference)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(id)
    .bind(opt_str(&body, "airline"))
    .bind(opt_str(&body, "flightNumber"))
    .bind(opt_str(&body, "departureAirport"))
    .bind(opt_str(&body, "arrivalAirport"))
    .bind(departure_time)
    .bind(arrival_time)
    .bind(opt_str(&body, "bookingReference"))
    .fetch_one(&pool)
    .await?;

    for (person, seat) in &passengers {
        sqlx::query(
            "INSERT INTO flight_passengers (flight_id, person_type, person_id, seat) VALUES ($1, $2, $3, $4)",
        )
        .bind(flight.id)
        .bind(person.person_type.to_string())
        .bind(person.person_id)
        .bind(seat)
        .execute(&pool)
        .await?;
    }

    let saved_passengers: Vec<FlightPassenger> =
        sqlx::query_as("SELECT * FROM flight_passengers WHERE flight_id = $1 ORDER BY id")
            .bind(flight.id)
            .fetch_all(&pool)
            .await?;

    let mut body = json!(flight);
    body["passengers"] = json!(saved_passengers);
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// GET /api/travel-requests/:id/hotels
pub async fn list_hotels(Path(id): Path<String>) -> Result<Json<Vec<Hotel>>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let rows: Vec<Hotel> =
        sqlx::query_as("SELECT * FROM hotels WHERE travel_request_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(&pool)
            .await?;
    Ok(Json(rows))
}

/// POST /api/travel-requests/:id/hotels
pub async fn create_hotel(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    require_fields(&body, &["name"])?;

    let check_in = parse_optional_date(&body, "checkIn")?;
    let check_out = parse_optional_date(&body, "checkOut")?;

    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let hotel: Hotel = sqlx::query_as(
        "INSERT INTO hotels (travel_request_id, name, city, check_in, check_out, booking_reference)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(id)
    .bind(opt_str(&body, "name"))
    .bind(opt_str(&body, "city"))
    .bind(check_in)
    .bind(check_out)
    .bind(opt_str(&body, "bookingReference"))
    .fetch_one(&pool)
    .await?;

    // Rooms may arrive with or without a guest assignment.
    if let Some(rooms) = body.get("rooms").and_then(|v| v.as_array()) {
        for room in rooms {
            let guest = match room.get("guest") {
                Some(g) if !g.is_null() => {
                    let person = PersonRef::from_body(g)?;
                    person::resolve_required(&pool, &person).await?;
                    Some(person)
                }
                _ => None,
            };
            sqlx::query(
                "INSERT INTO hotel_rooms (hotel_id, room_type, person_type, person_id) VALUES ($1, $2, $3, $4)",
            )
            .bind(hotel.id)
            .bind(opt_str(room, "roomType"))
            .bind(guest.map(|g| g.person_type.to_string()))
            .bind(guest.map(|g| g.person_id))
            .execute(&pool)
            .await?;
        }
    }

    let rooms: Vec<HotelRoom> =
        sqlx::query_as("SELECT * FROM hotel_rooms WHERE hotel_id = $1 ORDER BY id")
            .bind(hotel.id)
            .fetch_all(&pool)
            .await?;

    let mut body = json!(hotel);
    body["rooms"] = json!(rooms);
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// GET /api/travel-requests/:id/cars
pub async fn list_cars(Path(id): Path<String>) -> Result<Json<Vec<RentalCar>>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let rows: Vec<RentalCar> =
        sqlx::query_as("SELECT * FROM rental_cars WHERE travel_request_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(&pool)
            .await?;
    Ok(Json(rows))
}

/// POST /api/travel-requests/:id/cars
pub async fn create_car(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    require_fields(&body, &["pickupLocation"])?;

    let pickup_time = parse_optional_datetime(&body, "pickupTime")?;
    let dropoff_time = parse_optional_datetime(&body, "dropoffTime")?;

    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let row: RentalCar = sqlx::query_as(
        "INSERT INTO rental_cars (travel_request_id, company, car_model, pickup_location,
            dropoff_location, pickup_time, dropoff_time)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(id)
    .bind(opt_str(&body, "company"))
    .bind(opt_str(&body, "carModel"))
    .bind(opt_str(&body, "pickupLocation"))
    .bind(opt_str(&body, "dropoffLocation"))
    .bind(pickup_time)
    .bind(dropoff_time)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(row)).into_response())
}

/// GET /api/travel-requests/:id/private-jets
pub async fn list_jets(Path(id): Path<String>) -> Result<Json<Vec<PrivateJet>>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let rows: Vec<PrivateJet> =
        sqlx::query_as("SELECT * FROM private_jets WHERE travel_request_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(&pool)
            .await?;
    Ok(Json(rows))
}

/// POST /api/travel-requests/:id/private-jets
pub async fn create_jet(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    require_fields(&body, &["departureAirport", "arrivalAirport"])?;

    let departure_time = parse_optional_datetime(&body, "departureTime")?;
    let arrival_time = parse_optional_datetime(&body, "arrivalTime")?;

    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let row: PrivateJet = sqlx::query_as(
        "INSERT INTO private_jets (travel_request_id, operator, tail_number, departure_airport,
            arrival_airport, departure_time, arrival_time, booking_reference)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(id)
    .bind(opt_str(&body, "operator"))
    .bind(opt_str(&body, "tailNumber"))
    .bind(opt_str(&body, "departureAirport"))
    .bind(opt_str(&body, "arrivalAirport"))
    .bind(departure_time)
    .bind(arrival_time)
    .bind(opt_str(&body, "bookingReference"))
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(row)).into_response())
}

/// GET /api/travel-requests/:id/trains
pub async fn list_trains(Path(id): Path<String>) -> Result<Json<Vec<Train>>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let rows: Vec<Train> =
        sqlx::query_as("SELECT * FROM trains WHERE travel_request_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(&pool)
            .await?;
    Ok(Json(rows))
}

/// POST /api/travel-requests/:id/trains
pub async fn create_train(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    require_fields(&body, &["departureStation", "arrivalStation"])?;

    let departure_time = parse_optional_datetime(&body, "departureTime")?;
    let arrival_time = parse_optional_datetime(&body, "arrivalTime")?;

    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let row: Train = sqlx::query_as(
        "INSERT INTO trains (travel_request_id, operator, train_number, departure_station,
            arrival_station, departure_time, arrival_time, booking_reference)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(id)
    .bind(opt_str(&body, "operator"))
    .bind(opt_str(&body, "trainNumber"))
    .bind(opt_str(&body, "departureStation"))
    .bind(opt_str(&body, "arrivalStation"))
    .bind(departure_time)
    .bind(arrival_time)
    .bind(opt_str(&body, "bookingReference"))
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(row)).into_response())
}

/// GET /api/travel-requests/:id/embassy-services
pub async fn list_embassy_services(
    Path(id): Path<String>,
) -> Result<Json<Vec<EmbassyService>>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let rows: Vec<EmbassyService> =
        sqlx::query_as("SELECT * FROM embassy_services WHERE travel_request_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(&pool)
            .await?;
    Ok(Json(rows))
}

/// POST /api/travel-requests/:id/embassy-services
pub async fn create_embassy_service(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    require_fields(&body, &["country"])?;

    let appointment_at = parse_optional_datetime(&body, "appointmentAt")?;

    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let row: EmbassyService = sqlx::query_as(
        "INSERT INTO embassy_services (travel_request_id, country, service_type, appointment_at,
            reference_number, notes)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(id)
    .bind(opt_str(&body, "country"))
    .bind(opt_str(&body, "serviceType"))
    .bind(appointment_at)
    .bind(opt_str(&body, "referenceNumber"))
    .bind(opt_str(&body, "notes"))
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(row)).into_response())
}

/// GET /api/travel-requests/:id/meet-assist
pub async fn list_meet_assist(
    Path(id): Path<String>,
) -> Result<Json<Vec<MeetAssistService>>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let rows: Vec<MeetAssistService> = sqlx::query_as(
        "SELECT * FROM meet_assist_services WHERE travel_request_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;
    Ok(Json(rows))
}

/// POST /api/travel-requests/:id/meet-assist
pub async fn create_meet_assist(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    require_fields(&body, &["airport"])?;

    let scheduled_at = parse_optional_datetime(&body, "scheduledAt")?;

    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let row: MeetAssistService = sqlx::query_as(
        "INSERT INTO meet_assist_services (travel_request_id, airport, service_type, provider,
            scheduled_at, notes)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(id)
    .bind(opt_str(&body, "airport"))
    .bind(opt_str(&body, "serviceType"))
    .bind(opt_str(&body, "provider"))
    .bind(scheduled_at)
    .bind(opt_str(&body, "notes"))
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(row)).into_response())
}

/// GET /api/travel-requests/:id/events
pub async fn list_events(Path(id): Path<String>) -> Result<Json<Vec<TravelEvent>>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let rows: Vec<TravelEvent> =
        sqlx::query_as("SELECT * FROM travel_events WHERE travel_request_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(&pool)
            .await?;
    Ok(Json(rows))
}

/// POST /api/travel-requests/:id/events
pub async fn create_event(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    require_fields(&body, &["title"])?;

    let starts_at = parse_optional_datetime(&body, "startsAt")?;
    let ends_at = parse_optional_datetime(&body, "endsAt")?;

    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let mut participants: Vec<PersonRef> = Vec::new();
    if let Some(list) = body.get("participants").and_then(|v| v.as_array()) {
        for entry in list {
            let person = PersonRef::from_body(entry)?;
            person::resolve_required(&pool, &person).await?;
            participants.push(person);
        }
    }

    let event: TravelEvent = sqlx::query_as(
        "INSERT INTO travel_events (travel_request_id, title, location, starts_at, ends_at)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(id)
    .bind(opt_str(&body, "title"))
    .bind(opt_str(&body, "location"))
    .bind(starts_at)
    .bind(ends_at)
    .fetch_one(&pool)
    .await?;

    for person in &participants {
        sqlx::query("INSERT INTO event_participants (event_id, person_type, person_id) VALUES ($1, $2, $3)")
            .bind(event.id)
            .bind(person.person_type.to_string())
            .bind(person.person_id)
            .execute(&pool)
            .await?;
    }

    let saved: Vec<EventParticipant> =
        sqlx::query_as("SELECT * FROM event_participants WHERE event_id = $1 ORDER BY id")
            .bind(event.id)
            .fetch_all(&pool)
            .await?;

    let mut body = json!(event);
    body["participants"] = json!(saved);
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

async fn fetch_event(pool: &PgPool, request_id: i64, event_id: i64) -> Result<TravelEvent, ApiError> {
    sqlx::query_as::<_, TravelEvent>(
        "SELECT * FROM travel_events WHERE id = $1 AND travel_request_id = $2",
    )
    .bind(event_id)
    .bind(request_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found("travel event", event_id))
}

/// GET /api/travel-requests/:id/events/:eventId/attachments
pub async fn list_attachments(
    Path((id, event_id)): Path<(String, String)>,
) -> Result<Json<Vec<EventAttachment>>, ApiError> {
    let id = parse_id(&id)?;
    let event_id = parse_id(&event_id)?;
    let pool = Database::pool().await?;
    fetch_event(&pool, id, event_id).await?;

    let rows: Vec<EventAttachment> =
        sqlx::query_as("SELECT * FROM event_attachments WHERE event_id = $1 ORDER BY id")
            .bind(event_id)
            .fetch_all(&pool)
            .await?;
    Ok(Json(rows))
}

/// POST /api/travel-requests/:id/events/:eventId/attachments - stores the
/// file reference only; the file itself lives wherever `fileUrl` points
pub async fn create_attachment(
    Path((id, event_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let event_id = parse_id(&event_id)?;
    require_fields(&body, &["fileName"])?;

    let pool = Database::pool().await?;
    fetch_event(&pool, id, event_id).await?;

    let row: EventAttachment = sqlx::query_as(
        "INSERT INTO event_attachments (event_id, file_name, content_type, file_url)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(event_id)
    .bind(opt_str(&body, "fileName"))
    .bind(opt_str(&body, "contentType"))
    .bind(opt_str(&body, "fileUrl"))
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(row)).into_response())
}

/// GET /api/travel-requests/:id/communications - each entry embeds its
/// recipients
pub async fn list_communications(Path(id): Path<String>) -> Result<Json<Vec<Value>>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let rows: Vec<Communication> = sqlx::query_as(
        "SELECT * FROM travel_communications WHERE travel_request_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;
    let recipients: Vec<CommunicationRecipient> = sqlx::query_as(
        "SELECT cr.* FROM communication_recipients cr
         JOIN travel_communications c ON cr.communication_id = c.id
         WHERE c.travel_request_id = $1 ORDER BY cr.id",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    let rows = rows
        .iter()
        .map(|c| {
            let mut v = json!(c);
            v["recipients"] = json!(recipients
                .iter()
                .filter(|r| r.communication_id == c.id)
                .collect::<Vec<_>>());
            v
        })
        .collect();
    Ok(Json(rows))
}

/// POST /api/travel-requests/:id/communications - logs a message; recipients
/// are person references validated up front
pub async fn create_communication(
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    require_fields(&body, &["channel"])?;

    let sent_at = parse_optional_datetime(&body, "sentAt")?;

    let pool = Database::pool().await?;
    fetch_request(&pool, id).await?;

    let mut recipients: Vec<PersonRef> = Vec::new();
    if let Some(list) = body.get("recipients").and_then(|v| v.as_array()) {
        for entry in list {
            let person = PersonRef::from_body(entry)?;
            person::resolve_required(&pool, &person).await?;
            recipients.push(person);
        }
    }

    let communication: Communication = sqlx::query_as(
        "INSERT INTO travel_communications (travel_request_id, channel, subject, body, sent_at)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(id)
    .bind(opt_str(&body, "channel"))
    .bind(opt_str(&body, "subject"))
    .bind(opt_str(&body, "body"))
    .bind(sent_at)
    .fetch_one(&pool)
    .await?;

    for person in &recipients {
        sqlx::query(
            "INSERT INTO communication_recipients (communication_id, person_type, person_id) VALUES ($1, $2, $3)",
        )
        .bind(communication.id)
        .bind(person.person_type.to_string())
        .bind(person.person_id)
        .execute(&pool)
        .await?;
    }

    let saved: Vec<CommunicationRecipient> = sqlx::query_as(
        "SELECT * FROM communication_recipients WHERE communication_id = $1 ORDER BY id",
    )
    .bind(communication.id)
    .fetch_all(&pool)
    .await?;

    let mut body = json!(communication);
    body["recipients"] = json!(saved);
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// POST /api/travel-requests/:id/notify - send the itinerary through both
/// delivery channels; each reports independently
pub async fn notify(Path(id): Path<String>, Json(body): Json<Value>) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let pool = Database::pool().await?;
    let request = fetch_request(&pool, id).await?;
    let aggregate = load_aggregate(&pool, &request).await?;

    let recipient_email = opt_str(&body, "email");
    let recipient_phone = opt_str(&body, "phone");

    let results =
        crate::notify::send_itinerary(&aggregate, recipient_email.as_deref(), recipient_phone.as_deref())
            .await;

    Ok(Json(json!({ "requestNumber": request.request_number, "results": results })))
}
