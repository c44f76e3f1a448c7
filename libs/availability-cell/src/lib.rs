pub mod handlers;
pub mod models;
pub mod providers;
pub mod router;
pub mod services;
pub mod slots;

// Re-export the pieces other cells consume
pub use models::{AvailabilityError, SchedulingConfig, Shift, ShiftWindow};
pub use providers::{BookingProvider, ShiftProvider};
pub use services::availability::AvailabilityService;
