use std::sync::Arc;

use axum::{
    routing::{get, patch, put},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_bookings).post(handlers::create_booking))
        .route("/{booking_id}", get(handlers::get_booking))
        .route("/{booking_id}/reschedule", put(handlers::reschedule_booking))
        .route("/{booking_id}/status", patch(handlers::update_booking_status))
        .route("/{booking_id}/cancel", put(handlers::cancel_booking))
        .with_state(state)
}
