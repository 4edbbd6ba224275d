//! Request-shape rejections. All of these fail before any store access, so
//! they hold with or without a database behind the service.

mod common;

use axum::http::StatusCode;
use serde_json::json;

fn error_fields(body: &serde_json::Value) -> Vec<String> {
    body["validationErrors"]
        .as_array()
        .expect("validationErrors array")
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn employee_create_reports_all_missing_fields_in_order() {
    let (status, body) = common::post_json("/api/employees", json!({ "phone": "123" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(error_fields(&body), vec!["firstName", "lastName", "email"]);
}

#[tokio::test]
async fn blank_strings_count_as_missing() {
    let (status, body) = common::post_json(
        "/api/employees",
        json!({ "firstName": "  ", "lastName": "Doe", "email": "d@e.f" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["firstName"]);
}

#[tokio::test]
async fn non_numeric_path_id_is_a_400_not_a_crash() {
    let (status, body) = common::get("/api/employees/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["id"]);

    let (status, _) = common::get("/api/travel-requests/12x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn meeting_create_requires_title_date_and_start_time() {
    let (status, body) = common::post_json("/api/meetings", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["title", "date", "startTime"]);
}

#[tokio::test]
async fn meeting_create_rejects_malformed_date() {
    let (status, body) = common::post_json(
        "/api/meetings",
        json!({ "title": "standup", "date": "23/08/2026", "startTime": "09:00" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["date"]);
}

#[tokio::test]
async fn meeting_related_id_must_be_an_integer() {
    let (status, body) = common::post_json(
        "/api/meetings",
        json!({ "title": "standup", "date": "2026-08-24", "startTime": "09:00", "relatedId": "abc" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["relatedId"]);

    let (status, body) = common::post_json(
        "/api/meetings",
        json!({ "title": "standup", "date": "2026-08-24", "startTime": "09:00", "relatedId": 3.7 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["relatedId"]);
}

#[tokio::test]
async fn salary_employee_reference_must_be_an_integer() {
    let (status, body) = common::post_json(
        "/api/finance/salaries",
        json!({ "period": "2026-08", "baseSalary": 1000, "employeeId": "abc" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["employeeId"]);
}

#[tokio::test]
async fn employee_name_parts_must_be_strings() {
    let (status, body) = common::post_json(
        "/api/employees",
        json!({ "firstName": "John", "middleName": 123, "lastName": "Doe", "email": "j@d.e" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["middleName"]);
}

#[tokio::test]
async fn task_create_requires_a_title() {
    let (status, body) = common::post_json("/api/tasks", json!({ "priority": "HIGH" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["title"]);
}

#[tokio::test]
async fn travel_create_requires_title_and_requester() {
    let (status, body) = common::post_json("/api/travel-requests", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["title", "requesterName"]);
}

#[tokio::test]
async fn travel_legs_require_their_endpoints() {
    let (status, body) = common::post_json("/api/travel-requests/1/private-jets", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["departureAirport", "arrivalAirport"]);

    let (status, body) = common::post_json("/api/travel-requests/1/trains", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["departureStation", "arrivalStation"]);
}

#[tokio::test]
async fn embassy_and_meet_assist_require_their_anchors() {
    let (status, body) =
        common::post_json("/api/travel-requests/1/embassy-services", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["country"]);

    let (status, body) = common::post_json("/api/travel-requests/1/meet-assist", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["airport"]);
}

#[tokio::test]
async fn communication_requires_a_channel() {
    let (status, body) =
        common::post_json("/api/travel-requests/1/communications", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["channel"]);
}

#[tokio::test]
async fn dividend_create_requires_source_and_amount() {
    let (status, body) = common::post_json("/api/finance/dividends", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["source", "amount"]);
}

#[tokio::test]
async fn monthly_payment_due_day_must_be_in_range() {
    let (status, body) = common::post_json(
        "/api/finance/monthly-payments",
        json!({ "name": "Rent", "amount": 1200, "dueDay": 40 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["dueDay"]);
}

#[tokio::test]
async fn asset_create_rejects_non_numeric_amount() {
    let (status, body) = common::post_json(
        "/api/finance/assets",
        json!({ "name": "Car", "currentValue": true }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["currentValue"]);
}

#[tokio::test]
async fn salary_create_requires_period_and_base() {
    let (status, body) = common::post_json("/api/finance/salaries", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = error_fields(&body);
    assert!(fields.contains(&"period".to_string()));
    assert!(fields.contains(&"baseSalary".to_string()));
}

#[tokio::test]
async fn employer_create_requires_type_dependent_fields() {
    let (status, body) = common::post_json("/api/employers", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["employerType"]);

    let (status, body) =
        common::post_json("/api/employers", json!({ "employerType": "COMPANY" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["companyName"]);

    let (status, body) =
        common::post_json("/api/employers", json!({ "employerType": "PARTNERSHIP" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["employerType"]);
}
