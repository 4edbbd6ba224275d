//! Route table. Grouped by resource; every group merges into one `Router`
//! behind permissive CORS and HTTP tracing.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;
use crate::handlers;

pub fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(employee_routes())
        .merge(employer_routes())
        .merge(travel_routes())
        .merge(finance_routes())
        .merge(schedule_routes())
        .merge(reference_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router {
    Router::new().route("/api/auth/whoami", get(handlers::auth::whoami))
}

fn employee_routes() -> Router {
    use handlers::{employees, employees_v2};

    Router::new()
        .route("/api/employees", get(employees::list).post(employees::create))
        .route(
            "/api/employees/:id",
            get(employees::get)
                .put(employees::update)
                .patch(employees::patch)
                .delete(employees::delete),
        )
        .route("/api/v2/employees", get(employees_v2::list))
        .route("/api/v2/employees/:id", get(employees_v2::get))
}

fn employer_routes() -> Router {
    use handlers::employers;

    Router::new()
        .route("/api/employers", get(employers::list).post(employers::create))
        .route(
            "/api/employers/:id",
            get(employers::get)
                .patch(employers::patch)
                .delete(employers::delete),
        )
        .route("/api/v2/employers/:id", get(employers::get_v2))
        .route(
            "/api/employers/:id/contacts",
            get(employers::list_contacts).post(employers::create_contact),
        )
        .route(
            "/api/employers/:id/contacts/:contactId",
            put(employers::update_contact).delete(employers::delete_contact),
        )
}

fn travel_routes() -> Router {
    use handlers::travel;

    Router::new()
        .route("/api/travel-requests", get(travel::list).post(travel::create))
        .route(
            "/api/travel-requests/:id",
            get(travel::get).patch(travel::patch).delete(travel::delete),
        )
        .route("/api/travel-requests/:id/status", put(travel::put_status))
        .route(
            "/api/travel-requests/:id/destinations",
            get(travel::list_destinations).post(travel::create_destination),
        )
        .route(
            "/api/travel-requests/:id/flights",
            get(travel::list_flights).post(travel::create_flight),
        )
        .route(
            "/api/travel-requests/:id/hotels",
            get(travel::list_hotels).post(travel::create_hotel),
        )
        .route(
            "/api/travel-requests/:id/cars",
            get(travel::list_cars).post(travel::create_car),
        )
        .route(
            "/api/travel-requests/:id/private-jets",
            get(travel::list_jets).post(travel::create_jet),
        )
        .route(
            "/api/travel-requests/:id/trains",
            get(travel::list_trains).post(travel::create_train),
        )
        .route(
            "/api/travel-requests/:id/embassy-services",
            get(travel::list_embassy_services).post(travel::create_embassy_service),
        )
        .route(
            "/api/travel-requests/:id/meet-assist",
            get(travel::list_meet_assist).post(travel::create_meet_assist),
        )
        .route(
            "/api/travel-requests/:id/events",
            get(travel::list_events).post(travel::create_event),
        )
        .route(
            "/api/travel-requests/:id/events/:eventId/attachments",
            get(travel::list_attachments).post(travel::create_attachment),
        )
        .route(
            "/api/travel-requests/:id/communications",
            get(travel::list_communications).post(travel::create_communication),
        )
        .route("/api/travel-requests/:id/notify", post(travel::notify))
}

fn finance_routes() -> Router {
    use handlers::{finance, properties};

    Router::new()
        .route(
            "/api/finance/assets",
            get(finance::list_assets).post(finance::create_asset),
        )
        .route(
            "/api/finance/assets/:id",
            patch(finance::patch_asset).delete(finance::delete_asset),
        )
        .route(
            "/api/finance/liabilities",
            get(finance::list_liabilities).post(finance::create_liability),
        )
        .route(
            "/api/finance/liabilities/:id",
            delete(finance::delete_liability),
        )
        .route(
            "/api/finance/liabilities/:id/payments",
            get(finance::list_payments).post(finance::create_payment),
        )
        .route(
            "/api/finance/dividends",
            get(finance::list_dividends).post(finance::create_dividend),
        )
        .route(
            "/api/finance/dividends/:id",
            delete(finance::delete_dividend),
        )
        .route(
            "/api/finance/monthly-payments",
            get(finance::list_monthly_payments).post(finance::create_monthly_payment),
        )
        .route(
            "/api/finance/monthly-payments/:id",
            delete(finance::delete_monthly_payment),
        )
        .route(
            "/api/finance/monthly-payments/:id/payments",
            get(finance::list_monthly_payment_records).post(finance::create_monthly_payment_record),
        )
        .route(
            "/api/finance/salaries",
            get(finance::list_salaries).post(finance::create_salary),
        )
        .route(
            "/api/finance/properties",
            get(properties::list).post(properties::create),
        )
        .route(
            "/api/finance/properties/:id",
            get(properties::get)
                .patch(properties::patch)
                .delete(properties::delete),
        )
        .route(
            "/api/finance/properties/:id/tenants",
            get(properties::list_tenants).post(properties::create_tenant),
        )
}

fn schedule_routes() -> Router {
    use handlers::{meetings, tasks};

    Router::new()
        .route("/api/meetings", get(meetings::list).post(meetings::create))
        .route(
            "/api/meetings/:id",
            get(meetings::get)
                .patch(meetings::patch)
                .delete(meetings::delete),
        )
        .route("/api/meetings/:id/remind", post(meetings::remind))
        .route("/api/tasks", get(tasks::list).post(tasks::create))
        .route(
            "/api/tasks/:id",
            get(tasks::get).patch(tasks::patch).delete(tasks::delete),
        )
}

fn reference_routes() -> Router {
    use handlers::reference;

    Router::new()
        .route("/api/reference/departments", get(reference::departments))
        .route("/api/reference/positions", get(reference::positions))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "ICMS API",
            "version": version,
            "endpoints": {
                "auth": "/api/auth/whoami",
                "employees": "/api/employees[/:id], /api/v2/employees[/:id]",
                "employers": "/api/employers[/:id][/contacts]",
                "travel": "/api/travel-requests[/:id][/...]",
                "finance": "/api/finance/{assets,liabilities,dividends,monthly-payments,salaries,properties}",
                "schedule": "/api/meetings[/:id], /api/tasks[/:id]",
                "reference": "/api/reference/{departments,positions}",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match Database::health_check().await {
        Ok(()) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
