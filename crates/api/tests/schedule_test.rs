mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::{future_monday, test_server};

#[tokio::test]
async fn weekly_schedule_has_seven_entries_with_sunday_off() {
    let (server, _store) = test_server();

    let response = server.get("/api/schedule").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 7);

    assert_eq!(entries[0]["weekday"], 0);
    assert_eq!(entries[0]["is_working"], true);
    assert_eq!(entries[0]["work_start"], "09:00");
    assert_eq!(entries[0]["work_end"], "19:00");
    assert_eq!(entries[6]["weekday"], 6);
    assert_eq!(entries[6]["is_working"], false);
}

#[tokio::test]
async fn update_weekday_schedule_changes_window() {
    let (server, _store) = test_server();

    let response = server
        .put("/api/schedule/2")
        .json(&json!({ "work_start": "11:00", "work_end": "16:00" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["weekday"], 2);
    assert_eq!(body["work_start"], "11:00");
    assert_eq!(body["work_end"], "16:00");
}

#[tokio::test]
async fn update_weekday_schedule_rejects_inverted_window() {
    let (server, _store) = test_server();

    let response = server
        .put("/api/schedule/2")
        .json(&json!({ "work_start": "16:00", "work_end": "11:00" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_weekday_schedule_rejects_bad_weekday() {
    let (server, _store) = test_server();

    let response = server
        .put("/api/schedule/7")
        .json(&json!({ "is_working": false }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn days_off_round_trip() {
    let (server, _store) = test_server();
    let monday = future_monday();

    let response = server
        .post("/api/days-off")
        .json(&json!({ "date": monday }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let listed: Value = server.get("/api/days-off").await.json();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // A day off closes the resolved day.
    let day: Value = server.get(&format!("/api/days/{monday}")).await.json();
    assert_eq!(day["is_working"], false);
    assert_eq!(day["work_start"], Value::Null);

    let response = server.delete(&format!("/api/days-off/{monday}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let day: Value = server.get(&format!("/api/days/{monday}")).await.json();
    assert_eq!(day["is_working"], true);
}

#[tokio::test]
async fn day_context_carries_window_and_breaks() {
    let (server, _store) = test_server();
    let monday = future_monday();

    server
        .post("/api/breaks")
        .json(&json!({ "weekday": null, "start_time": "13:00", "end_time": "14:00" }))
        .await;

    let day: Value = server.get(&format!("/api/days/{monday}")).await.json();
    assert_eq!(day["is_working"], true);
    assert_eq!(day["work_start"], "09:00");
    assert_eq!(day["work_end"], "19:00");
    assert_eq!(day["breaks"][0]["start_time"], "13:00");
    assert_eq!(day["breaks"][0]["end_time"], "14:00");
}

#[tokio::test]
async fn breaks_crud_and_weekday_filter() {
    let (server, _store) = test_server();

    let global: Value = server
        .post("/api/breaks")
        .json(&json!({ "weekday": null, "start_time": "13:00", "end_time": "14:00" }))
        .await
        .json();
    let tuesday: Value = server
        .post("/api/breaks")
        .json(&json!({ "weekday": 1, "start_time": "10:00", "end_time": "10:30" }))
        .await
        .json();

    let monday_breaks: Value = server
        .get("/api/breaks")
        .add_query_param("weekday", 0)
        .await
        .json();
    assert_eq!(monday_breaks.as_array().unwrap().len(), 1);

    let tuesday_breaks: Value = server
        .get("/api/breaks")
        .add_query_param("weekday", 1)
        .await
        .json();
    assert_eq!(tuesday_breaks.as_array().unwrap().len(), 2);

    let all_breaks: Value = server.get("/api/breaks").await.json();
    assert_eq!(all_breaks.as_array().unwrap().len(), 2);

    // Disabling hides the break from weekday queries but keeps it on record.
    let global_id = global["id"].as_str().unwrap();
    let response = server
        .put(&format!("/api/breaks/{global_id}/enabled"))
        .json(&json!({ "enabled": false }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let monday_breaks: Value = server
        .get("/api/breaks")
        .add_query_param("weekday", 0)
        .await
        .json();
    assert_eq!(monday_breaks.as_array().unwrap().len(), 0);

    let tuesday_id = tuesday["id"].as_str().unwrap();
    let response = server.delete(&format!("/api/breaks/{tuesday_id}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server.delete(&format!("/api/breaks/{tuesday_id}")).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_break_rejects_inverted_interval() {
    let (server, _store) = test_server();

    let response = server
        .post("/api/breaks")
        .json(&json!({ "weekday": null, "start_time": "14:00", "end_time": "13:00" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
