use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AvailabilityError, CreateShiftRequest, Shift};

/// Shift administration. The availability engine itself is read-only over
/// shifts; this service is the write side used by clinic admins.
pub struct ShiftService {
    supabase: Arc<SupabaseClient>,
}

impl ShiftService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub async fn create_shift(
        &self,
        doctor_id: Uuid,
        request: CreateShiftRequest,
        auth_token: &str,
    ) -> Result<Shift, AvailabilityError> {
        debug!("Creating shift for doctor {} on weekday {}", doctor_id, request.weekday);

        if !(1..=7).contains(&request.weekday) {
            return Err(AvailabilityError::Validation(
                "Weekday must be between 1 (Monday) and 7 (Sunday)".to_string(),
            ));
        }

        if request.start_time >= request.end_time {
            return Err(AvailabilityError::Validation(
                "Start time must be before end time".to_string(),
            ));
        }

        self.check_shift_overlap(doctor_id, &request, auth_token).await?;

        let shift_data = json!({
            "doctor_id": doctor_id,
            "weekday": request.weekday,
            "start_time": request.start_time.format("%H:%M:%S").to_string(),
            "end_time": request.end_time.format("%H:%M:%S").to_string(),
            "is_active": true,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/doctor_shifts",
                Some(auth_token),
                Some(shift_data),
                Some(headers),
            )
            .await
            .map_err(|e| AvailabilityError::Database(e.to_string()))?;

        let row = result
            .first()
            .ok_or_else(|| AvailabilityError::Database("Failed to create shift".to_string()))?;

        let shift: Shift = serde_json::from_value(row.clone())
            .map_err(|e| AvailabilityError::Database(format!("Failed to parse shift: {}", e)))?;
        debug!("Shift created with ID: {}", shift.id);

        Ok(shift)
    }

    pub async fn list_shifts(
        &self,
        doctor_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Vec<Shift>, AvailabilityError> {
        let path = format!(
            "/rest/v1/doctor_shifts?doctor_id=eq.{}&order=weekday.asc,start_time.asc",
            doctor_id
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await
            .map_err(|e| AvailabilityError::Database(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Shift>, _>>()
            .map_err(|e| AvailabilityError::Database(format!("Failed to parse shifts: {}", e)))
    }

    /// Shifts are deactivated, never deleted; bookings made under an old
    /// shift keep their history.
    pub async fn deactivate_shift(
        &self,
        shift_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AvailabilityError> {
        debug!("Deactivating shift {}", shift_id);

        let path = format!("/rest/v1/doctor_shifts?id=eq.{}", shift_id);
        let update = json!({
            "is_active": false,
            "updated_at": Utc::now().to_rfc3339()
        });

        let _: Vec<Value> = self
            .supabase
            .request(Method::PATCH, &path, Some(auth_token), Some(update))
            .await
            .map_err(|e| AvailabilityError::Database(e.to_string()))?;

        Ok(())
    }

    async fn check_shift_overlap(
        &self,
        doctor_id: Uuid,
        request: &CreateShiftRequest,
        auth_token: &str,
    ) -> Result<(), AvailabilityError> {
        let path = format!(
            "/rest/v1/doctor_shifts?doctor_id=eq.{}&weekday=eq.{}&is_active=eq.true",
            doctor_id, request.weekday
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AvailabilityError::Database(e.to_string()))?;

        let existing: Vec<Shift> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Shift>, _>>()
            .map_err(|e| AvailabilityError::Database(format!("Failed to parse shifts: {}", e)))?;

        for shift in existing {
            if request.start_time < shift.end_time && request.end_time > shift.start_time {
                return Err(AvailabilityError::Validation(format!(
                    "Shift overlaps with existing shift {} - {}",
                    shift.start_time, shift.end_time
                )));
            }
        }

        Ok(())
    }
}
