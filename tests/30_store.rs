//! Store-backed invariants. These need a migrated database behind
//! DATABASE_URL; without one each test returns early, mirroring how the
//! DB-free suites guard the opposite way.

mod common;

use axum::http::StatusCode;
use serde_json::json;

fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

#[tokio::test]
async fn at_most_one_primary_contact_survives_create_and_update() {
    if common::no_database() {
        return;
    }

    let (status, employer) = common::post_json(
        "/api/employers",
        json!({ "employerType": "COMPANY", "companyName": unique("Acme") }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let employer_id = employer["id"].as_i64().expect("employer id");
    let contacts_path = format!("/api/employers/{}/contacts", employer_id);

    let (status, first) = common::post_json(
        &contacts_path,
        json!({ "name": "Ann Lee", "isPrimary": true }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["isPrimary"], true);
    let first_id = first["id"].as_i64().expect("contact id");

    // Creating a second primary demotes the first in the same transaction.
    let (status, second) = common::post_json(
        &contacts_path,
        json!({ "name": "Bob Ray", "isPrimary": true }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["isPrimary"], true);

    let (status, contacts) = common::get(&contacts_path).await;
    assert_eq!(status, StatusCode::OK);
    let contacts = contacts.as_array().expect("contacts array");
    assert_eq!(contacts.len(), 2);
    let primaries: Vec<_> = contacts.iter().filter(|c| c["isPrimary"] == true).collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0]["name"], "Bob Ray");

    // Promoting the first back via PUT swaps again, never leaving two.
    let (status, promoted) = common::put_json(
        &format!("{}/{}", contacts_path, first_id),
        json!({ "name": "Ann Lee", "isPrimary": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promoted["isPrimary"], true);

    let (_, contacts) = common::get(&contacts_path).await;
    let contacts = contacts.as_array().expect("contacts array");
    let primaries: Vec<_> = contacts.iter().filter(|c| c["isPrimary"] == true).collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0]["name"], "Ann Lee");

    common::delete(&format!("/api/employers/{}", employer_id)).await;
}

#[tokio::test]
async fn tenant_creation_marks_the_property_rented() {
    if common::no_database() {
        return;
    }

    let (status, created) =
        common::post_json("/api/finance/properties", json!({ "name": unique("Flat") })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["isRented"], false);
    let property_id = created["data"]["id"].as_i64().expect("property id");

    let (status, tenant) = common::post_json(
        &format!("/api/finance/properties/{}/tenants", property_id),
        json!({ "name": "Cara Im", "isPrimary": true, "monthlyRent": 950 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tenant["data"]["isPrimary"], true);

    let (status, body) = common::get(&format!("/api/finance/properties/{}", property_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isRented"], true);
    assert_eq!(body["data"]["tenants"].as_array().expect("tenants").len(), 1);

    common::delete(&format!("/api/finance/properties/{}", property_id)).await;
}
