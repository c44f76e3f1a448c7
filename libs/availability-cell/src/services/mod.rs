pub mod availability;
pub mod shifts;

pub use availability::AvailabilityService;
pub use shifts::ShiftService;
