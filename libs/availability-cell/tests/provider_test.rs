use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use availability_cell::models::ShiftWindow;
use availability_cell::providers::{
    BookingProvider, ShiftProvider, SupabaseBookingStore, SupabaseShiftStore,
};
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        supabase_url: base_url.to_string(),
        supabase_anon_key: "test-anon-key".to_string(),
        slot_step_minutes: 30,
        conflict_buffer_minutes: 30,
    }
}

fn shift_row(doctor_id: Uuid, weekday: u8, start: &str, end: &str) -> serde_json::Value {
    json!({
        "id": Uuid::new_v4(),
        "doctor_id": doctor_id,
        "weekday": weekday,
        "start_time": start,
        "end_time": end,
        "is_active": true,
        "created_at": "2025-06-01T08:00:00Z",
        "updated_at": "2025-06-01T08:00:00Z"
    })
}

#[tokio::test]
async fn shift_store_returns_minute_window() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_shifts"))
        .and(query_param("doctor_id", format!("eq.{}", doctor_id)))
        .and(query_param("weekday", "eq.1"))
        .and(query_param("is_active", "eq.true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            shift_row(doctor_id, 1, "09:00:00", "12:00:00")
        ])))
        .mount(&server)
        .await;

    let store = SupabaseShiftStore::new(Arc::new(SupabaseClient::new(&test_config(&server.uri()))));
    let window = store.active_shift(doctor_id, 1, None).await.unwrap();

    assert_eq!(
        window,
        Some(ShiftWindow {
            start_minute: 9 * 60,
            end_minute: 12 * 60
        })
    );
}

#[tokio::test]
async fn shift_store_takes_first_row_when_duplicates_exist() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    // Two active rows for the same weekday is a data anomaly; the earliest
    // (first by start_time ordering) wins
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_shifts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            shift_row(doctor_id, 1, "08:00:00", "11:00:00"),
            shift_row(doctor_id, 1, "13:00:00", "17:00:00")
        ])))
        .mount(&server)
        .await;

    let store = SupabaseShiftStore::new(Arc::new(SupabaseClient::new(&test_config(&server.uri()))));
    let window = store.active_shift(doctor_id, 1, None).await.unwrap();

    assert_eq!(
        window,
        Some(ShiftWindow {
            start_minute: 8 * 60,
            end_minute: 11 * 60
        })
    );
}

#[tokio::test]
async fn shift_store_returns_none_without_rows() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_shifts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = SupabaseShiftStore::new(Arc::new(SupabaseClient::new(&test_config(&server.uri()))));
    let window = store.active_shift(Uuid::new_v4(), 3, None).await.unwrap();
    assert_eq!(window, None);
}

#[tokio::test]
async fn booking_store_requests_non_cancelled_rows_only() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("doctor_id", format!("eq.{}", doctor_id)))
        .and(query_param("booking_date", "eq.2025-06-09"))
        .and(query_param("status", "neq.cancelled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": Uuid::new_v4(), "booking_time": "09:30:00" },
            { "id": Uuid::new_v4(), "booking_time": "11:00:00" }
        ])))
        .mount(&server)
        .await;

    let store =
        SupabaseBookingStore::new(Arc::new(SupabaseClient::new(&test_config(&server.uri()))));
    let minutes = store.booked_minutes(doctor_id, date, None, None).await.unwrap();

    assert_eq!(minutes, vec![9 * 60 + 30, 11 * 60]);
}

#[tokio::test]
async fn booking_store_excludes_the_booking_being_rescheduled() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let booking_id = Uuid::new_v4();
    let date = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("neq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store =
        SupabaseBookingStore::new(Arc::new(SupabaseClient::new(&test_config(&server.uri()))));
    let minutes = store
        .booked_minutes(doctor_id, date, Some(booking_id), None)
        .await
        .unwrap();

    assert!(minutes.is_empty());
}
