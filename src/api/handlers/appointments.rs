use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::business::BusinessId;
use crate::api::dtos::requests::{
    BookAppointmentRequest, CancelAppointmentRequest, CloseAppointmentRequest, RescheduleAppointmentRequest,
};
use crate::api::handlers::required_date;
use crate::domain::services::appointment_service::{BookingRequest, RescheduleRequest};
use crate::domain::services::calendar::parse_time;
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Json(payload): Json<BookAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = BookingRequest {
        business_id,
        customer_id: payload.customer_id,
        staff_id: payload.staff_id,
        date: payload.date,
        time: parse_time(&payload.time)?,
        duration_minutes: payload.duration_minutes,
        service_id: payload.service_id,
        created_via: payload.created_via,
        changed_by: payload.changed_by,
    };

    let appointment = state.appointment_service.book(request).await?;
    info!("Booked appointment {} on slot {}", appointment.id, appointment.slot_id);
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, appointment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let appointment = state.appointment_service.get(&business_id, &appointment_id).await?;
    Ok(Json(appointment))
}

pub async fn get_history(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, appointment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let history = state.appointment_service.history(&business_id, &appointment_id).await?;
    Ok(Json(history))
}

pub async fn list_staff_appointments(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, staff_id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let start = required_date(&params, "start")?;
    let end = required_date(&params, "end")?;
    let appointments = state.appointment_service.list_for_staff(&business_id, &staff_id, start, end).await?;
    Ok(Json(appointments))
}

pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, appointment_id)): Path<(String, String)>,
    Json(payload): Json<CancelAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let cancelled = state.appointment_service
        .cancel(&business_id, &appointment_id, payload.reason, payload.changed_by)
        .await?;
    Ok(Json(cancelled))
}

pub async fn reschedule_appointment(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, appointment_id)): Path<(String, String)>,
    Json(payload): Json<RescheduleAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = RescheduleRequest {
        new_date: payload.new_date,
        new_time: parse_time(&payload.new_time)?,
        new_staff_id: payload.new_staff_id,
        changed_by: payload.changed_by,
    };
    let updated = state.appointment_service.reschedule(&business_id, &appointment_id, request).await?;
    Ok(Json(updated))
}

pub async fn complete_appointment(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, appointment_id)): Path<(String, String)>,
    Json(payload): Json<CloseAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let completed = state.appointment_service.complete(&business_id, &appointment_id, payload.changed_by).await?;
    Ok(Json(completed))
}

pub async fn mark_no_show(
    State(state): State<Arc<AppState>>,
    BusinessId(business_id): BusinessId,
    Path((_, appointment_id)): Path<(String, String)>,
    Json(payload): Json<CloseAppointmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let closed = state.appointment_service
        .mark_no_show(&business_id, &appointment_id, payload.changed_by, payload.notes)
        .await?;
    Ok(Json(closed))
}
