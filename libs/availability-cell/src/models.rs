use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::slots::minute_of_day;

/// A doctor's recurring working window for one weekday.
/// Weekday encoding is 1 = Monday .. 7 = Sunday throughout the workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub weekday: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shift {
    pub fn window(&self) -> ShiftWindow {
        ShiftWindow {
            start_minute: minute_of_day(self.start_time),
            end_minute: minute_of_day(self.end_time),
        }
    }
}

/// Shift bounds as minute-of-day integers. All slot arithmetic happens on
/// these, never on timezone-carrying datetimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    pub start_minute: u16,
    pub end_minute: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateShiftRequest {
    pub weekday: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Slot step and conflict buffer are distinct knobs. The clinic may offer
/// 15-minute slots while still requiring 30 minutes between bookings.
#[derive(Debug, Clone, Copy)]
pub struct SchedulingConfig {
    pub step_minutes: u16,
    pub buffer_minutes: u16,
}

impl SchedulingConfig {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            step_minutes: config.slot_step_minutes,
            buffer_minutes: config.conflict_buffer_minutes,
        }
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            step_minutes: shared_config::DEFAULT_SLOT_STEP_MINUTES,
            buffer_minutes: shared_config::DEFAULT_CONFLICT_BUFFER_MINUTES,
        }
    }
}

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::Validation(msg) => AppError::ValidationError(msg),
            AvailabilityError::Database(msg) => AppError::Database(msg),
        }
    }
}
