use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{appointments, business_hours, exceptions, health, schedule, slots};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Business configuration
        .route("/api/v1/{business_id}/business-hours", get(business_hours::get_business_hours).put(business_hours::replace_business_hours))

        // Slots
        .route("/api/v1/{business_id}/staff/{staff_id}/slots", get(slots::list_available_slots))
        .route("/api/v1/{business_id}/staff/{staff_id}/slots/generate", post(slots::generate_slots))
        .route("/api/v1/{business_id}/slots/{slot_id}/block", post(slots::block_slot))
        .route("/api/v1/{business_id}/slots/{slot_id}/unblock", post(slots::unblock_slot))

        // Weekly schedule
        .route("/api/v1/{business_id}/staff/{staff_id}/schedule", get(schedule::get_schedule).put(schedule::commit_schedule))
        .route("/api/v1/{business_id}/staff/{staff_id}/schedule/validate", post(schedule::validate_schedule))

        // Exceptions & time off
        .route("/api/v1/{business_id}/staff/{staff_id}/exceptions", get(exceptions::list_exceptions).post(exceptions::upsert_exception))
        .route("/api/v1/{business_id}/staff/{staff_id}/exceptions/{date}", delete(exceptions::delete_exception))
        .route(
            "/api/v1/{business_id}/staff/{staff_id}/time-off",
            get(exceptions::list_time_off).post(exceptions::add_time_off).delete(exceptions::remove_time_off),
        )

        // Appointments
        .route("/api/v1/{business_id}/appointments", post(appointments::book_appointment))
        .route("/api/v1/{business_id}/appointments/{appointment_id}", get(appointments::get_appointment))
        .route("/api/v1/{business_id}/appointments/{appointment_id}/history", get(appointments::get_history))
        .route("/api/v1/{business_id}/appointments/{appointment_id}/cancel", post(appointments::cancel_appointment))
        .route("/api/v1/{business_id}/appointments/{appointment_id}/reschedule", post(appointments::reschedule_appointment))
        .route("/api/v1/{business_id}/appointments/{appointment_id}/complete", post(appointments::complete_appointment))
        .route("/api/v1/{business_id}/appointments/{appointment_id}/no-show", post(appointments::mark_no_show))
        .route("/api/v1/{business_id}/staff/{staff_id}/appointments", get(appointments::list_staff_appointments))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        business_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
