use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use availability_cell::models::AvailabilityError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Booked,
    Cancelled,
    Done,
}

impl BookingStatus {
    /// Cancelled rows stay in history but stop occupying their slot.
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Booked) | (Pending, Cancelled) | (Booked, Done) | (Booked, Cancelled)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Booked => "booked",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Done => "done",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
    pub animal_id: Uuid,
    pub owner_id: Uuid,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub doctor_id: Uuid,
    pub clinic_id: Uuid,
    pub animal_id: Uuid,
    pub owner_id: Uuid,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleBookingRequest {
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("The requested slot is no longer available")]
    SlotUnavailable,

    #[error("A conflicting booking was committed concurrently")]
    ConflictDetected,

    #[error("Invalid status transition: {0} -> {1}")]
    InvalidStatusTransition(BookingStatus, BookingStatus),

    #[error("Booking not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<AvailabilityError> for BookingError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::Validation(msg) => BookingError::Validation(msg),
            AvailabilityError::Database(msg) => BookingError::Database(msg),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            // Conflicts are distinct from validation failures so callers can
            // re-query availability and retry with a different slot
            BookingError::SlotUnavailable | BookingError::ConflictDetected => {
                AppError::Conflict(err.to_string())
            }
            BookingError::InvalidStatusTransition(_, _) | BookingError::Validation(_) => {
                AppError::ValidationError(err.to_string())
            }
            BookingError::NotFound => AppError::NotFound(err.to_string()),
            BookingError::Database(msg) => AppError::Database(msg),
        }
    }
}
