use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use availability_cell::services::availability::AvailabilityService;
use shared_config::AppConfig;
use shared_database::supabase::{RpcError, SupabaseClient};

use crate::models::{
    Booking, BookingError, BookingStatus, CreateBookingRequest, RescheduleBookingRequest,
};

/// Booking workflow. The availability pre-check is advisory; the
/// `book_appointment` / `reschedule_booking` database functions re-check the
/// buffer range and write in one statement, so a concurrent insert inside
/// the buffer window loses there even when both pre-checks passed.
pub struct BookingService {
    supabase: Arc<SupabaseClient>,
    availability: AvailabilityService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            availability: AvailabilityService::new(config),
        }
    }

    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
        auth_token: &str,
    ) -> Result<Booking, BookingError> {
        info!(
            "Booking doctor {} on {} at {}",
            request.doctor_id, request.booking_date, request.booking_time
        );

        let available = self
            .availability
            .is_slot_available(
                request.doctor_id,
                request.booking_date,
                request.booking_time,
                None,
                Some(auth_token),
            )
            .await?;

        if !available {
            warn!(
                "Slot {} {} for doctor {} is not available",
                request.booking_date, request.booking_time, request.doctor_id
            );
            return Err(BookingError::SlotUnavailable);
        }

        let args = json!({
            "p_doctor_id": request.doctor_id,
            "p_clinic_id": request.clinic_id,
            "p_animal_id": request.animal_id,
            "p_owner_id": request.owner_id,
            "p_booking_date": request.booking_date,
            "p_booking_time": request.booking_time.format("%H:%M:%S").to_string(),
            "p_notes": request.notes,
        });

        let rows: Vec<Booking> = self
            .supabase
            .rpc("book_appointment", Some(auth_token), args)
            .await
            .map_err(map_rpc_error)?;

        let booking = rows
            .into_iter()
            .next()
            .ok_or_else(|| BookingError::Database("Booking function returned no row".to_string()))?;

        info!("Booking {} created for doctor {}", booking.id, booking.doctor_id);
        Ok(booking)
    }

    pub async fn reschedule_booking(
        &self,
        booking_id: Uuid,
        request: RescheduleBookingRequest,
        auth_token: &str,
    ) -> Result<Booking, BookingError> {
        debug!("Rescheduling booking {}", booking_id);

        let current = self.get_booking(booking_id, auth_token).await?;
        if matches!(current.status, BookingStatus::Cancelled | BookingStatus::Done) {
            return Err(BookingError::Validation(format!(
                "Cannot reschedule a {} booking",
                current.status
            )));
        }

        // The booking being moved must not conflict with itself
        let available = self
            .availability
            .is_slot_available(
                current.doctor_id,
                request.booking_date,
                request.booking_time,
                Some(booking_id),
                Some(auth_token),
            )
            .await?;

        if !available {
            return Err(BookingError::SlotUnavailable);
        }

        let args = json!({
            "p_booking_id": booking_id,
            "p_booking_date": request.booking_date,
            "p_booking_time": request.booking_time.format("%H:%M:%S").to_string(),
        });

        let rows: Vec<Booking> = self
            .supabase
            .rpc("reschedule_booking", Some(auth_token), args)
            .await
            .map_err(map_rpc_error)?;

        rows.into_iter()
            .next()
            .ok_or_else(|| BookingError::Database("Reschedule function returned no row".to_string()))
    }

    pub async fn update_status(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
        auth_token: &str,
    ) -> Result<Booking, BookingError> {
        debug!("Updating booking {} status to {}", booking_id, new_status);

        let current = self.get_booking(booking_id, auth_token).await?;
        if !current.status.can_transition_to(new_status) {
            return Err(BookingError::InvalidStatusTransition(current.status, new_status));
        }

        let path = format!("/rest/v1/bookings?id=eq.{}", booking_id);
        let update = json!({
            "status": new_status,
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(auth_token), Some(update), Some(headers))
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or(BookingError::NotFound)?;

        serde_json::from_value(row)
            .map_err(|e| BookingError::Database(format!("Failed to parse booking: {}", e)))
    }

    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        auth_token: &str,
    ) -> Result<Booking, BookingError> {
        self.update_status(booking_id, BookingStatus::Cancelled, auth_token)
            .await
    }

    pub async fn get_booking(
        &self,
        booking_id: Uuid,
        auth_token: &str,
    ) -> Result<Booking, BookingError> {
        let path = format!("/rest/v1/bookings?id=eq.{}", booking_id);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        let row = result.into_iter().next().ok_or(BookingError::NotFound)?;

        serde_json::from_value(row)
            .map_err(|e| BookingError::Database(format!("Failed to parse booking: {}", e)))
    }

    pub async fn list_bookings(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<Booking>, BookingError> {
        let path = format!(
            "/rest/v1/bookings?doctor_id=eq.{}&booking_date=eq.{}&order=booking_time.asc",
            doctor_id, date
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Booking>, _>>()
            .map_err(|e| BookingError::Database(format!("Failed to parse bookings: {}", e)))
    }
}

fn map_rpc_error(err: RpcError) -> BookingError {
    match err {
        RpcError::Conflict(msg) => {
            warn!("Booking rejected by database guard: {}", msg);
            BookingError::ConflictDetected
        }
        RpcError::Request(msg) => BookingError::Database(msg),
    }
}
