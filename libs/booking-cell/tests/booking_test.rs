use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::models::{
    BookingError, BookingStatus, CreateBookingRequest, RescheduleBookingRequest,
};
use booking_cell::services::booking::BookingService;
use shared_config::AppConfig;

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        supabase_url: base_url.to_string(),
        supabase_anon_key: "test-anon-key".to_string(),
        slot_step_minutes: 30,
        conflict_buffer_minutes: 30,
    }
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

// 2025-06-09 is a Monday
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()
}

fn create_request(doctor_id: Uuid, booking_time: NaiveTime) -> CreateBookingRequest {
    CreateBookingRequest {
        doctor_id,
        clinic_id: Uuid::new_v4(),
        animal_id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        booking_date: monday(),
        booking_time,
        notes: Some("Annual check-up".to_string()),
    }
}

fn booking_row(
    booking_id: Uuid,
    doctor_id: Uuid,
    booking_time: &str,
    status: &str,
) -> serde_json::Value {
    json!({
        "id": booking_id,
        "doctor_id": doctor_id,
        "clinic_id": Uuid::new_v4(),
        "animal_id": Uuid::new_v4(),
        "owner_id": Uuid::new_v4(),
        "booking_date": "2025-06-09",
        "booking_time": booking_time,
        "status": status,
        "notes": null,
        "created_at": "2025-06-01T08:00:00Z",
        "updated_at": "2025-06-01T08:00:00Z"
    })
}

async fn mount_monday_shift(server: &MockServer, doctor_id: Uuid) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_shifts"))
        .and(query_param("doctor_id", format!("eq.{}", doctor_id)))
        .and(query_param("weekday", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "weekday": 1,
            "start_time": "09:00:00",
            "end_time": "12:00:00",
            "is_active": true,
            "created_at": "2025-06-01T08:00:00Z",
            "updated_at": "2025-06-01T08:00:00Z"
        }])))
        .mount(server)
        .await;
}

async fn mount_booked_times(server: &MockServer, rows: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("status", "neq.cancelled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

#[tokio::test]
async fn create_booking_books_an_open_slot() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let booking_id = Uuid::new_v4();

    mount_monday_shift(&server, doctor_id).await;
    mount_booked_times(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/book_appointment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            booking_row(booking_id, doctor_id, "10:00:00", "pending")
        ])))
        .mount(&server)
        .await;

    let service = BookingService::new(&test_config(&server.uri()));
    let booking = service
        .create_booking(create_request(doctor_id, time(10, 0)), "owner-token")
        .await
        .unwrap();

    assert_eq!(booking.id, booking_id);
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.booking_time, time(10, 0));
}

#[tokio::test]
async fn create_booking_rejects_a_slot_inside_the_buffer() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    mount_monday_shift(&server, doctor_id).await;
    // Existing booking ten minutes before the requested slot
    mount_booked_times(
        &server,
        json!([{ "id": Uuid::new_v4(), "booking_time": "09:50:00" }]),
    )
    .await;

    let service = BookingService::new(&test_config(&server.uri()));
    let result = service
        .create_booking(create_request(doctor_id, time(10, 0)), "owner-token")
        .await;

    assert_matches!(result, Err(BookingError::SlotUnavailable));
}

#[tokio::test]
async fn create_booking_rejects_a_day_without_shift() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_shifts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let service = BookingService::new(&test_config(&server.uri()));
    let result = service
        .create_booking(create_request(doctor_id, time(10, 0)), "owner-token")
        .await;

    assert_matches!(result, Err(BookingError::SlotUnavailable));
}

#[tokio::test]
async fn concurrent_insert_loses_at_the_database_guard() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    // Pre-check sees a free calendar, but the guard function rejects the
    // insert because a competing booking landed first
    mount_monday_shift(&server, doctor_id).await;
    mount_booked_times(&server, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/book_appointment"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "conflicting booking within buffer window"
        })))
        .mount(&server)
        .await;

    let service = BookingService::new(&test_config(&server.uri()));
    let result = service
        .create_booking(create_request(doctor_id, time(10, 0)), "owner-token")
        .await;

    assert_matches!(result, Err(BookingError::ConflictDetected));
}

#[tokio::test]
async fn reschedule_does_not_conflict_with_itself() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let booking_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            booking_row(booking_id, doctor_id, "10:00:00", "booked")
        ])))
        .mount(&server)
        .await;

    mount_monday_shift(&server, doctor_id).await;

    // The availability re-check excludes the booking being moved; with it
    // excluded the calendar is empty
    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("status", "neq.cancelled"))
        .and(query_param("id", format!("neq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/reschedule_booking"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            booking_row(booking_id, doctor_id, "10:30:00", "booked")
        ])))
        .mount(&server)
        .await;

    let service = BookingService::new(&test_config(&server.uri()));
    let booking = service
        .reschedule_booking(
            booking_id,
            RescheduleBookingRequest {
                booking_date: monday(),
                booking_time: time(10, 30),
            },
            "admin-token",
        )
        .await
        .unwrap();

    assert_eq!(booking.booking_time, time(10, 30));
}

#[tokio::test]
async fn done_booking_cannot_return_to_booked() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let booking_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            booking_row(booking_id, doctor_id, "10:00:00", "done")
        ])))
        .mount(&server)
        .await;

    let service = BookingService::new(&test_config(&server.uri()));
    let result = service
        .update_status(booking_id, BookingStatus::Booked, "admin-token")
        .await;

    assert_matches!(
        result,
        Err(BookingError::InvalidStatusTransition(BookingStatus::Done, BookingStatus::Booked))
    );
}

#[tokio::test]
async fn pending_booking_can_be_cancelled() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let booking_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            booking_row(booking_id, doctor_id, "10:00:00", "pending")
        ])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            booking_row(booking_id, doctor_id, "10:00:00", "cancelled")
        ])))
        .mount(&server)
        .await;

    let service = BookingService::new(&test_config(&server.uri()));
    let booking = service.cancel_booking(booking_id, "owner-token").await.unwrap();

    assert_eq!(booking.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn missing_booking_is_not_found() {
    let server = MockServer::start().await;
    let booking_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let service = BookingService::new(&test_config(&server.uri()));
    let result = service.get_booking(booking_id, "owner-token").await;

    assert_matches!(result, Err(BookingError::NotFound));
}
