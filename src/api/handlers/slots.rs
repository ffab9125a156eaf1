use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::business::BusinessId;
use crate::api::dtos::requests::GenerateSlotsRequest;
use crate::api::dtos::responses::{AvailableSlotsResponse, SlotResponse};
use crate::api::handlers::{optional_date, required_date};
use crate::domain::services::require_business_staff;
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub async fn generate_slots(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, staff_id)): Path<(String, String)>,
    Json(payload): Json<GenerateSlotsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let staff = require_business_staff(state.repos.staff_directory.as_ref(), &business_id, &staff_id).await?;
    let days = payload.days_ahead.unwrap_or(state.config.slot_horizon_days);

    let report = match payload.start_date {
        Some(start) => state.slot_compiler.generate_from(&staff.id, start, days).await?,
        None => state.slot_compiler.generate_slots(&staff.id, days).await?,
    };
    info!("Generated {} slots for staff {}", report.inserted, staff.id);
    Ok(Json(report))
}

pub async fn list_available_slots(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, staff_id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let start = required_date(&params, "start")?;
    let end = optional_date(&params, "end")?;

    let staff = require_business_staff(state.repos.staff_directory.as_ref(), &business_id, &staff_id).await?;
    let slots = state.slot_allocator.find_available(&staff.id, start, end).await?;

    Ok(Json(AvailableSlotsResponse {
        staff_id: staff.id,
        start,
        end: end.unwrap_or(start),
        slots: slots.into_iter().map(SlotResponse::from).collect(),
    }))
}

pub async fn block_slot(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, slot_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let slot = state.slot_allocator.block(&business_id, &slot_id).await?;
    Ok(Json(SlotResponse::from(slot)))
}

pub async fn unblock_slot(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, slot_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let slot = state.slot_allocator.unblock(&business_id, &slot_id).await?;
    Ok(Json(SlotResponse::from(slot)))
}
