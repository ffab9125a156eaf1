mod common;

use axum::http::StatusCode;
use chrono::Weekday;
use common::{next_weekday, today, TestApp, BUSINESS_ID};
use serde_json::json;

fn weekday_schedule() -> serde_json::Value {
    json!({
        "schedule": (1..=5).map(|day| json!({
            "day_of_week": day,
            "start_time": "9:00",
            "end_time": "12:00",
            "slot_duration_minutes": 30
        })).collect::<Vec<_>>()
    })
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.request("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_booking_flow_over_http() {
    let app = TestApp::new().await;
    app.seed_business_hours(BUSINESS_ID).await;
    let staff_id = app.seed_staff(BUSINESS_ID).await;
    let customer_id = app.seed_customer(BUSINESS_ID).await;
    let monday = next_weekday(today(), Weekday::Mon);

    let (status, body) = app
        .request("PUT", &format!("/api/v1/{}/staff/{}/schedule", BUSINESS_ID, staff_id), Some(weekday_schedule()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["templates"].as_array().unwrap().len(), 5);
    assert_eq!(body["validation"]["is_valid"], true);

    let (status, body) = app
        .request("GET", &format!("/api/v1/{}/staff/{}/slots?start={}", BUSINESS_ID, staff_id, monday), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 6);
    assert_eq!(slots[0]["time"], "09:00");

    let booking = json!({
        "customer_id": customer_id,
        "staff_id": staff_id,
        "date": monday.to_string(),
        "time": "09:00",
        "duration_minutes": 30
    });
    let (status, appointment) = app
        .request("POST", &format!("/api/v1/{}/appointments", BUSINESS_ID), Some(booking.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(appointment["status"], "scheduled");
    assert_eq!(appointment["sync_status"], "pending");
    let appointment_id = appointment["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .request("POST", &format!("/api/v1/{}/appointments", BUSINESS_ID), Some(booking))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "slot_unavailable");

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/v1/{}/appointments/{}/reschedule", BUSINESS_ID, appointment_id),
            Some(json!({ "new_date": monday.to_string(), "new_time": "10:30" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["time"], "10:30:00");

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/v1/{}/appointments/{}/cancel", BUSINESS_ID, appointment_id),
            Some(json!({ "reason": "changed plans" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, body) = app
        .request("POST", &format!("/api/v1/{}/appointments/{}/cancel", BUSINESS_ID, appointment_id), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "invalid_transition");

    let (status, body) = app
        .request("GET", &format!("/api/v1/{}/appointments/{}/history", BUSINESS_ID, appointment_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<_> = body.as_array().unwrap().iter().map(|h| h["change_type"].as_str().unwrap().to_string()).collect();
    assert_eq!(kinds, vec!["created", "rescheduled", "cancelled"]);

    let (status, body) = app
        .request("GET", &format!("/api/v1/{}/staff/{}/slots?start={}", BUSINESS_ID, staff_id, monday), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slots"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_invalid_schedule_returns_every_error() {
    let app = TestApp::new().await;
    app.seed_business_hours(BUSINESS_ID).await;
    let staff_id = app.seed_staff(BUSINESS_ID).await;

    let proposed = json!({
        "schedule": [
            { "day_of_week": 1, "start_time": "08:59", "end_time": "12:00", "slot_duration_minutes": 30 },
            { "day_of_week": 0, "start_time": "10:00", "end_time": "12:00", "slot_duration_minutes": 30 }
        ]
    });

    let (status, body) = app
        .request("POST", &format!("/api/v1/{}/staff/{}/schedule/validate", BUSINESS_ID, staff_id), Some(proposed.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_valid"], false);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .request("PUT", &format!("/api/v1/{}/staff/{}/schedule", BUSINESS_ID, staff_id), Some(proposed))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_failed");
    assert_eq!(body["errors"][0]["code"], "starts_before_open");
    assert_eq!(body["errors"][1]["code"], "business_closed");
}

#[tokio::test]
async fn test_time_off_over_http() {
    let app = TestApp::new().await;
    app.seed_business_hours(BUSINESS_ID).await;
    let staff_id = app.seed_staff(BUSINESS_ID).await;
    let monday = next_weekday(today(), Weekday::Mon);
    let friday = monday + chrono::Duration::days(4);

    app.request("PUT", &format!("/api/v1/{}/staff/{}/schedule", BUSINESS_ID, staff_id), Some(weekday_schedule())).await;

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/v1/{}/staff/{}/time-off", BUSINESS_ID, staff_id),
            Some(json!({ "start_date": monday.to_string(), "end_date": friday.to_string(), "reason": "holiday" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exceptions"].as_array().unwrap().len(), 5);
    assert_eq!(body["refresh"]["removed"], 30);

    let (status, body) = app
        .request("GET", &format!("/api/v1/{}/staff/{}/time-off", BUSINESS_ID, staff_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["start_date"], monday.to_string());
    assert_eq!(body[0]["end_date"], friday.to_string());
    assert_eq!(body[0]["exception_type"], "time_off");

    let (status, body) = app
        .request("GET", &format!("/api/v1/{}/staff/{}/slots?start={}&end={}", BUSINESS_ID, staff_id, monday, friday), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["slots"].as_array().unwrap().is_empty());

    let (status, _) = app
        .request("DELETE", &format!("/api/v1/{}/staff/{}/time-off?start={}&end={}", BUSINESS_ID, staff_id, monday, friday), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_not_found_and_bad_input() {
    let app = TestApp::new().await;
    let staff_id = app.seed_staff(BUSINESS_ID).await;

    let (status, body) = app.request("GET", &format!("/api/v1/{}/appointments/nope", BUSINESS_ID), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, _) = app.request("GET", &format!("/api/v1/other/staff/{}/schedule", staff_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request("GET", &format!("/api/v1/{}/staff/{}/slots?start=2030-13-01", BUSINESS_ID, staff_id), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");

    let (status, _) = app.request("GET", &format!("/api/v1/{}/staff/{}/slots", BUSINESS_ID, staff_id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_rejects_oversized_horizon() {
    let app = TestApp::new().await;
    let staff_id = app.seed_staff(BUSINESS_ID).await;
    let uri = format!("/api/v1/{}/staff/{}/slots/generate", BUSINESS_ID, staff_id);

    let (status, body) = app.request("POST", &uri, Some(json!({ "days_ahead": 4_000_000_000u32 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");

    let (status, body) = app.request("POST", &uri, Some(json!({ "days_ahead": 7 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 0);
}
