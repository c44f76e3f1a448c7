use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AvailabilityError, SchedulingConfig};
use crate::providers::{BookingProvider, ShiftProvider, SupabaseBookingStore, SupabaseShiftStore};
use crate::slots::{filter_available, generate_slots, minute_of_day, time_of_day, weekday_code};

/// Composes the availability pipeline: weekday resolution, shift lookup,
/// slot generation, booking lookup, buffer filtering. Stateless per request;
/// every query re-fetches current shift and booking rows.
pub struct AvailabilityService {
    shifts: Arc<dyn ShiftProvider>,
    bookings: Arc<dyn BookingProvider>,
    scheduling: SchedulingConfig,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        Self {
            shifts: Arc::new(SupabaseShiftStore::new(Arc::clone(&supabase))),
            bookings: Arc::new(SupabaseBookingStore::new(supabase)),
            scheduling: SchedulingConfig::from_config(config),
        }
    }

    pub fn with_providers(
        shifts: Arc<dyn ShiftProvider>,
        bookings: Arc<dyn BookingProvider>,
        scheduling: SchedulingConfig,
    ) -> Self {
        Self {
            shifts,
            bookings,
            scheduling,
        }
    }

    /// Open slots for a doctor on a clinic-local date, ascending.
    pub async fn get_available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Vec<NaiveTime>, AvailabilityError> {
        let minutes = self.available_minutes(doctor_id, date, None, auth_token).await?;
        Ok(minutes.into_iter().filter_map(time_of_day).collect())
    }

    /// Write-path re-check: is this exact slot still offered? Rescheduling
    /// passes its own booking id so the booking does not conflict with itself.
    pub async fn is_slot_available(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        exclude_booking: Option<Uuid>,
        auth_token: Option<&str>,
    ) -> Result<bool, AvailabilityError> {
        let minutes = self
            .available_minutes(doctor_id, date, exclude_booking, auth_token)
            .await?;
        Ok(minutes.contains(&minute_of_day(time)))
    }

    async fn available_minutes(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        exclude_booking: Option<Uuid>,
        auth_token: Option<&str>,
    ) -> Result<Vec<u16>, AvailabilityError> {
        let weekday = weekday_code(date);
        debug!("Resolving slots for doctor {} on {} (weekday {})", doctor_id, date, weekday);

        let window = match self.shifts.active_shift(doctor_id, weekday, auth_token).await? {
            Some(window) => window,
            None => {
                debug!("Doctor {} has no active shift on weekday {}", doctor_id, weekday);
                return Ok(Vec::new());
            }
        };

        if window.start_minute >= window.end_minute {
            warn!(
                "doctor {} has a malformed shift on weekday {} ({} >= {})",
                doctor_id, weekday, window.start_minute, window.end_minute
            );
            return Ok(Vec::new());
        }

        let slots = generate_slots(window, self.scheduling.step_minutes);
        let booked = self
            .bookings
            .booked_minutes(doctor_id, date, exclude_booking, auth_token)
            .await?;

        let available = filter_available(&slots, &booked, self.scheduling.buffer_minutes);
        debug!(
            "Doctor {} on {}: {} generated, {} booked, {} available",
            doctor_id,
            date,
            slots.len(),
            booked.len(),
            available.len()
        );
        Ok(available)
    }
}
