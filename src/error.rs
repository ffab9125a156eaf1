use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::domain::models::availability::ScheduleValidation;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Slot unavailable: {0}")]
    SlotUnavailable(String),
    #[error("Concurrent modification: {0}")]
    ConcurrencyConflict(String),
    #[error("Schedule validation failed with {} error(s)", .0.errors.len())]
    ValidationFailed(ScheduleValidation),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl AppError {
    /// Lost a race for a slot, either at reservation or at the guarded update.
    pub fn is_slot_unavailable(&self) -> bool {
        matches!(self, AppError::SlotUnavailable(_) | AppError::ConcurrencyConflict(_))
    }
}

/// SQLite reports `2067`, Postgres `23505`.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| {
            db_err.is_unique_violation()
                || matches!(db_err.code().as_deref(), Some("2067") | Some("23505"))
        })
        .unwrap_or(false)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Database(e) => {
                if is_unique_violation(e) {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "error": "Resource already exists (duplicate entry)", "code": "duplicate" }))
                    ).into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::SlotUnavailable(msg) | AppError::ConcurrencyConflict(msg) => {
                (StatusCode::CONFLICT, "slot_unavailable", msg.clone())
            }
            AppError::ValidationFailed(report) => {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({
                        "error": "Schedule violates business hours",
                        "code": "validation_failed",
                        "is_valid": report.is_valid,
                        "errors": report.errors,
                        "warnings": report.warnings,
                    }))
                ).into_response();
            }
            AppError::InvalidTransition(msg) => (StatusCode::CONFLICT, "invalid_transition", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "invalid_input", msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}
