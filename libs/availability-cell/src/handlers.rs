use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::CreateShiftRequest;
use crate::services::{availability::AvailabilityService, shifts::ShiftService};

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

/// Public: the authoritative list of open slots for a doctor on a date.
/// Clients must treat this as the single source of truth and never compute
/// slots themselves.
#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let slots = availability_service
        .get_available_slots(doctor_id, query.date, None)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": query.date,
        "available_slots": slots,
        "total_slots": slots.len()
    })))
}

#[axum::debug_handler]
pub async fn list_shifts(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let shift_service = ShiftService::new(&state);

    let shifts = shift_service
        .list_shifts(doctor_id, None)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "shifts": shifts
    })))
}

#[axum::debug_handler]
pub async fn create_shift(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<CreateShiftRequest>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let shift_service = ShiftService::new(&state);

    let shift = shift_service
        .create_shift(doctor_id, request, token)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(shift)))
}

#[axum::debug_handler]
pub async fn deactivate_shift(
    State(state): State<Arc<AppConfig>>,
    Path((_doctor_id, shift_id)): Path<(Uuid, Uuid)>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let token = auth.token();
    let shift_service = ShiftService::new(&state);

    shift_service
        .deactivate_shift(shift_id, token)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "success": true })))
}
