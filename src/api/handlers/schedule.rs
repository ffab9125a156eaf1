use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::business::BusinessId;
use crate::api::dtos::requests::ScheduleRequest;
use crate::error::AppError;
use std::sync::Arc;

pub async fn validate_schedule(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, staff_id)): Path<(String, String)>,
    Json(payload): Json<ScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let entries = payload.into_entries()?;
    let report = state.schedule_service.validate_schedule(&business_id, &staff_id, &entries).await?;
    Ok(Json(report))
}

pub async fn commit_schedule(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, staff_id)): Path<(String, String)>,
    Json(payload): Json<ScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let entries = payload.into_entries()?;
    let committed = state.schedule_service.commit_schedule(&business_id, &staff_id, entries).await?;
    Ok(Json(committed))
}

pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, staff_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let templates = state.schedule_service.get_schedule(&business_id, &staff_id).await?;
    Ok(Json(templates))
}
