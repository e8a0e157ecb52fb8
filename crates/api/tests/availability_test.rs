mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::{future_monday, test_server};

fn starts(body: &Value) -> Vec<String> {
    body["starts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn long_service_gets_hourly_grid() {
    let (server, _store) = test_server();
    let monday = future_monday();

    let response = server
        .get("/api/availability")
        .add_query_param("date", monday)
        .add_query_param("duration", 40)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["duration_minutes"], 40);
    let slots = starts(&body);
    assert_eq!(slots.len(), 10);
    assert_eq!(slots.first().unwrap(), "09:00");
    assert_eq!(slots.last().unwrap(), "18:00");
}

#[tokio::test]
async fn short_service_unlocks_extra_slot_per_cell() {
    let (server, _store) = test_server();
    let monday = future_monday();

    let response = server
        .get("/api/availability")
        .add_query_param("date", monday)
        .add_query_param("duration", 15)
        .await;
    let body: Value = response.json();
    let slots = starts(&body);

    // Each hourly cell also offers a start where the previous short
    // service's occupied span ends: ceil(15 + 5, 15) = 30 minutes in.
    assert_eq!(slots.len(), 20);
    assert_eq!(&slots[..4], &["09:00", "09:30", "10:00", "10:30"]);
}

#[tokio::test]
async fn active_booking_blocks_overlapping_starts() {
    let (server, _store) = test_server();
    let monday = future_monday();

    server
        .post("/api/bookings")
        .json(&json!({
            "client_id": 1,
            "date": monday,
            "start_time": "10:00",
            "duration_minutes": 60,
            "service_code": "haircut",
            "service_name": "Haircut",
            "price_text": "25",
            "client_name": "Alex",
            "phone": "+100000000"
        }))
        .await;

    let body: Value = server
        .get("/api/availability")
        .add_query_param("date", monday)
        .add_query_param("duration", 40)
        .await
        .json();
    let slots = starts(&body);
    assert_eq!(slots.len(), 9);
    assert!(!slots.contains(&"10:00".to_string()));
}

#[tokio::test]
async fn break_blocks_overlapping_starts() {
    let (server, _store) = test_server();
    let monday = future_monday();

    server
        .post("/api/breaks")
        .json(&json!({ "weekday": null, "start_time": "13:00", "end_time": "14:00" }))
        .await;

    let body: Value = server
        .get("/api/availability")
        .add_query_param("date", monday)
        .add_query_param("duration", 40)
        .await
        .json();
    let slots = starts(&body);
    assert_eq!(slots.len(), 9);
    assert!(!slots.contains(&"13:00".to_string()));
}

#[tokio::test]
async fn day_off_yields_no_slots() {
    let (server, _store) = test_server();
    let monday = future_monday();

    server
        .post("/api/days-off")
        .json(&json!({ "date": monday }))
        .await;

    let body: Value = server
        .get("/api/availability")
        .add_query_param("date", monday)
        .add_query_param("duration", 40)
        .await
        .json();
    assert!(starts(&body).is_empty());
}

#[tokio::test]
async fn zero_duration_is_rejected() {
    let (server, _store) = test_server();
    let monday = future_monday();

    let response = server
        .get("/api/availability")
        .add_query_param("date", monday)
        .add_query_param("duration", 0)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_duration_is_rejected() {
    let (server, _store) = test_server();
    let monday = future_monday();

    let response = server
        .get("/api/availability")
        .add_query_param("date", monday)
        .add_query_param("duration", 65000)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancelled_booking_no_longer_blocks() {
    let (server, _store) = test_server();
    let monday = future_monday();

    let created: Value = server
        .post("/api/bookings")
        .json(&json!({
            "client_id": 1,
            "date": monday,
            "start_time": "10:00",
            "duration_minutes": 60,
            "service_code": null,
            "service_name": "Haircut",
            "price_text": "25",
            "client_name": "Alex",
            "phone": "+100000000"
        }))
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    server
        .post(&format!("/api/bookings/{id}/cancel"))
        .json(&json!({ "client_id": 1 }))
        .await;

    let body: Value = server
        .get("/api/availability")
        .add_query_param("date", monday)
        .add_query_param("duration", 40)
        .await
        .json();
    assert_eq!(starts(&body).len(), 10);
}
