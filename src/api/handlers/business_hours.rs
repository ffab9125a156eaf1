use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::business::BusinessId;
use crate::api::dtos::requests::ReplaceBusinessHoursRequest;
use crate::domain::models::business_hours::BusinessHours;
use crate::error::AppError;
use std::sync::Arc;

pub async fn get_business_hours(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
) -> Result<impl IntoResponse, AppError> {
    let hours = state.schedule_service.business_hours(&business_id).await?;
    Ok(Json(hours))
}

pub async fn replace_business_hours(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Json(payload): Json<ReplaceBusinessHoursRequest>,
) -> Result<impl IntoResponse, AppError> {
    let hours = payload.days
        .into_iter()
        .map(|day| day.into_model(&business_id))
        .collect::<Result<Vec<BusinessHours>, AppError>>()?;

    let saved = state.schedule_service.replace_business_hours(&business_id, hours).await?;
    Ok(Json(saved))
}
