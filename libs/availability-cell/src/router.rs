use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn availability_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        // Availability query (public, read-only)
        .route("/{doctor_id}/available-slots", get(handlers::get_available_slots))
        // Shift administration
        .route(
            "/{doctor_id}/shifts",
            get(handlers::list_shifts).post(handlers::create_shift),
        )
        .route(
            "/{doctor_id}/shifts/{shift_id}/deactivate",
            patch(handlers::deactivate_shift),
        )
        .with_state(state)
}
