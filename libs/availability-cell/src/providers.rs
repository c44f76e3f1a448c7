use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{AvailabilityError, Shift, ShiftWindow};
use crate::slots::minute_of_day;

/// Read side of shift storage. The availability engine only ever consults
/// the active shift for one (doctor, weekday).
#[async_trait]
pub trait ShiftProvider: Send + Sync {
    async fn active_shift(
        &self,
        doctor_id: Uuid,
        weekday: u8,
        auth_token: Option<&str>,
    ) -> Result<Option<ShiftWindow>, AvailabilityError>;
}

/// Read side of booking storage: every non-cancelled booked time for one
/// (doctor, date). Pending, booked and done all occupy their slot.
#[async_trait]
pub trait BookingProvider: Send + Sync {
    async fn booked_minutes(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        exclude_booking: Option<Uuid>,
        auth_token: Option<&str>,
    ) -> Result<Vec<u16>, AvailabilityError>;
}

pub struct SupabaseShiftStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseShiftStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl ShiftProvider for SupabaseShiftStore {
    async fn active_shift(
        &self,
        doctor_id: Uuid,
        weekday: u8,
        auth_token: Option<&str>,
    ) -> Result<Option<ShiftWindow>, AvailabilityError> {
        let path = format!(
            "/rest/v1/doctor_shifts?doctor_id=eq.{}&weekday=eq.{}&is_active=eq.true&order=start_time.asc",
            doctor_id, weekday
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| AvailabilityError::Database(e.to_string()))?;

        let shifts: Vec<Shift> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Shift>, _>>()
            .map_err(|e| AvailabilityError::Database(format!("Failed to parse shifts: {}", e)))?;

        if shifts.len() > 1 {
            // Data anomaly: the schedule admin flow prevents overlaps, so
            // more than one active row should not happen. First row wins.
            warn!(
                "doctor {} has {} active shifts for weekday {}, using the earliest",
                doctor_id,
                shifts.len(),
                weekday
            );
        }

        Ok(shifts.first().map(Shift::window))
    }
}

#[derive(Debug, Deserialize)]
struct BookedRow {
    booking_time: NaiveTime,
}

pub struct SupabaseBookingStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseBookingStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl BookingProvider for SupabaseBookingStore {
    async fn booked_minutes(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        exclude_booking: Option<Uuid>,
        auth_token: Option<&str>,
    ) -> Result<Vec<u16>, AvailabilityError> {
        let mut path = format!(
            "/rest/v1/bookings?doctor_id=eq.{}&booking_date=eq.{}&status=neq.cancelled&order=booking_time.asc&select=id,booking_time",
            doctor_id, date
        );

        if let Some(exclude_id) = exclude_booking {
            path.push_str(&format!("&id=neq.{}", exclude_id));
        }

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| AvailabilityError::Database(e.to_string()))?;

        let rows: Vec<BookedRow> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<BookedRow>, _>>()
            .map_err(|e| AvailabilityError::Database(format!("Failed to parse bookings: {}", e)))?;

        Ok(rows.iter().map(|row| minute_of_day(row.booking_time)).collect())
    }
}
