use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::business::BusinessId;
use crate::api::dtos::requests::{ExceptionRequestBody, TimeOffRequest};
use crate::api::handlers::{optional_date, required_date};
use crate::domain::models::exception::ExceptionType;
use crate::domain::services::calendar::parse_date;
use crate::domain::services::exception_service::ExceptionRequest;
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;

pub async fn upsert_exception(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, staff_id)): Path<(String, String)>,
    Json(payload): Json<ExceptionRequestBody>,
) -> Result<impl IntoResponse, AppError> {
    let request = ExceptionRequest {
        date: payload.date,
        exception_type: payload.exception_type,
        start_time: payload.start()?,
        end_time: payload.end()?,
        reason: payload.reason,
    };
    let change = state.exception_service.upsert_exception(&business_id, &staff_id, request).await?;
    Ok(Json(change))
}

pub async fn list_exceptions(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, staff_id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let start = required_date(&params, "start")?;
    let end = required_date(&params, "end")?;
    let exceptions = state.exception_service.list_exceptions(&business_id, &staff_id, start, end).await?;
    Ok(Json(exceptions))
}

pub async fn delete_exception(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, staff_id, date_str)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&date_str)?;
    let refresh = state.exception_service.delete_exception(&business_id, &staff_id, date).await?;
    Ok(Json(refresh))
}

pub async fn add_time_off(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, staff_id)): Path<(String, String)>,
    Json(payload): Json<TimeOffRequest>,
) -> Result<impl IntoResponse, AppError> {
    let change = state.exception_service
        .add_time_off(
            &business_id,
            &staff_id,
            payload.start_date,
            payload.end_date,
            payload.exception_type.unwrap_or(ExceptionType::TimeOff),
            payload.reason,
        )
        .await?;
    Ok(Json(change))
}

pub async fn remove_time_off(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, staff_id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let start = required_date(&params, "start")?;
    let end = required_date(&params, "end")?;
    let refresh = state.exception_service.remove_time_off(&business_id, &staff_id, start, end).await?;
    Ok(Json(refresh))
}

pub async fn list_time_off(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, staff_id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let from = optional_date(&params, "from")?;
    let periods = state.exception_service.list_time_off(&business_id, &staff_id, from).await?;
    Ok(Json(periods))
}
