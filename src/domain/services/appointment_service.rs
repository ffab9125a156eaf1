use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{info, warn};

use crate::domain::models::appointment::{
    Appointment, AppointmentHistoryEntry, AppointmentStatus, NewAppointment, RescheduleTarget,
};
use crate::domain::ports::{AppointmentRepository, CustomerDirectory, StaffDirectory};
use crate::domain::services::{calendar::normalize_time, require_business_staff};
use crate::error::AppError;

pub const DEFAULT_CREATED_VIA: &str = "api";
pub const DEFAULT_CHANGED_BY: &str = "system";

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub business_id: String,
    pub customer_id: String,
    pub staff_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i32,
    pub service_id: Option<String>,
    pub created_via: Option<String>,
    pub changed_by: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RescheduleRequest {
    pub new_date: NaiveDate,
    pub new_time: NaiveTime,
    pub new_staff_id: Option<String>,
    pub changed_by: Option<String>,
}

/// Owns the appointment lifecycle: `scheduled -> {completed, cancelled, no_show}`,
/// plus `scheduled -> scheduled` via reschedule. Slot reservation, the appointment
/// row and the history entry are written in one repository transaction.
pub struct AppointmentService {
    staff_directory: Arc<dyn StaffDirectory>,
    customer_directory: Arc<dyn CustomerDirectory>,
    appointment_repo: Arc<dyn AppointmentRepository>,
}

impl AppointmentService {
    pub fn new(
        staff_directory: Arc<dyn StaffDirectory>,
        customer_directory: Arc<dyn CustomerDirectory>,
        appointment_repo: Arc<dyn AppointmentRepository>,
    ) -> Self {
        Self { staff_directory, customer_directory, appointment_repo }
    }

    /// `SlotUnavailable` is returned untouched and never retried here; the caller
    /// decides which alternative to offer.
    pub async fn book(&self, request: BookingRequest) -> Result<Appointment, AppError> {
        if request.duration_minutes <= 0 {
            return Err(AppError::Validation("duration must be a positive number of minutes".into()));
        }

        let staff = require_business_staff(self.staff_directory.as_ref(), &request.business_id, &request.staff_id).await?;
        if !staff.active {
            return Err(AppError::Validation(format!("Staff {} is not accepting bookings", staff.id)));
        }
        if !self.customer_directory.customer_exists(&request.customer_id, &request.business_id).await? {
            return Err(AppError::NotFound(format!("Customer {} not found", request.customer_id)));
        }

        let draft = NewAppointment {
            business_id: request.business_id,
            customer_id: request.customer_id,
            staff_id: staff.id,
            service_id: request.service_id,
            date: request.date,
            time: normalize_time(request.time),
            duration_minutes: request.duration_minutes,
            created_via: request.created_via.unwrap_or_else(|| DEFAULT_CREATED_VIA.to_string()),
            changed_by: request.changed_by.unwrap_or_else(|| DEFAULT_CHANGED_BY.to_string()),
        };

        match self.appointment_repo.book(&draft).await {
            Ok(appointment) => {
                info!(
                    appointment_id = %appointment.id,
                    slot_id = %appointment.slot_id,
                    staff_id = %appointment.staff_id,
                    "appointment booked"
                );
                Ok(appointment)
            }
            Err(e) if e.is_slot_unavailable() => {
                info!(staff_id = %draft.staff_id, date = %draft.date, time = %draft.time, "booking lost: slot unavailable");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get(&self, business_id: &str, appointment_id: &str) -> Result<Appointment, AppError> {
        self.appointment_repo.find_by_id(business_id, appointment_id).await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", appointment_id)))
    }

    pub async fn list_for_staff(
        &self,
        business_id: &str,
        staff_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Appointment>, AppError> {
        if end < start {
            return Err(AppError::Validation("end date must not be before start date".into()));
        }
        let staff = require_business_staff(self.staff_directory.as_ref(), business_id, staff_id).await?;
        self.appointment_repo.list_by_staff(&staff.id, start, end).await
    }

    pub async fn history(&self, business_id: &str, appointment_id: &str) -> Result<Vec<AppointmentHistoryEntry>, AppError> {
        let appointment = self.get(business_id, appointment_id).await?;
        self.appointment_repo.list_history(&appointment.id).await
    }

    pub async fn cancel(
        &self,
        business_id: &str,
        appointment_id: &str,
        reason: Option<String>,
        changed_by: Option<String>,
    ) -> Result<Appointment, AppError> {
        let appointment = self.get(business_id, appointment_id).await?;
        ensure_transition(&appointment, AppointmentStatus::Cancelled)?;

        let changed_by = changed_by.unwrap_or_else(|| DEFAULT_CHANGED_BY.to_string());
        let cancelled = self.appointment_repo.cancel(&appointment, reason, &changed_by).await?;
        info!(appointment_id = %cancelled.id, slot_id = %cancelled.slot_id, "appointment cancelled");
        Ok(cancelled)
    }

    /// All-or-nothing: if the new slot cannot be reserved, neither slot nor the
    /// appointment changes.
    pub async fn reschedule(
        &self,
        business_id: &str,
        appointment_id: &str,
        request: RescheduleRequest,
    ) -> Result<Appointment, AppError> {
        let appointment = self.get(business_id, appointment_id).await?;
        ensure_transition(&appointment, AppointmentStatus::Scheduled)?;

        let staff_id = match request.new_staff_id {
            Some(new_staff_id) if new_staff_id != appointment.staff_id => {
                let staff = require_business_staff(self.staff_directory.as_ref(), business_id, &new_staff_id).await?;
                if !staff.active {
                    return Err(AppError::Validation(format!("Staff {} is not accepting bookings", staff.id)));
                }
                staff.id
            }
            _ => appointment.staff_id.clone(),
        };

        let target = RescheduleTarget {
            staff_id,
            date: request.new_date,
            time: normalize_time(request.new_time),
        };
        if target.staff_id == appointment.staff_id && target.date == appointment.date && target.time == appointment.time {
            return Err(AppError::Validation("Appointment is already scheduled at that time".into()));
        }

        let changed_by = request.changed_by.unwrap_or_else(|| DEFAULT_CHANGED_BY.to_string());
        match self.appointment_repo.reschedule(&appointment, &target, &changed_by).await {
            Ok(updated) => {
                info!(
                    appointment_id = %updated.id,
                    old_slot = %appointment.slot_id,
                    new_slot = %updated.slot_id,
                    "appointment rescheduled"
                );
                Ok(updated)
            }
            Err(e) => {
                if e.is_slot_unavailable() {
                    info!(appointment_id = %appointment.id, "reschedule rejected: target slot unavailable");
                } else {
                    warn!(appointment_id = %appointment.id, "reschedule failed: {}", e);
                }
                Err(e)
            }
        }
    }

    pub async fn complete(&self, business_id: &str, appointment_id: &str, changed_by: Option<String>) -> Result<Appointment, AppError> {
        self.close(business_id, appointment_id, AppointmentStatus::Completed, changed_by, None).await
    }

    pub async fn mark_no_show(
        &self,
        business_id: &str,
        appointment_id: &str,
        changed_by: Option<String>,
        notes: Option<String>,
    ) -> Result<Appointment, AppError> {
        self.close(business_id, appointment_id, AppointmentStatus::NoShow, changed_by, notes).await
    }

    async fn close(
        &self,
        business_id: &str,
        appointment_id: &str,
        status: AppointmentStatus,
        changed_by: Option<String>,
        notes: Option<String>,
    ) -> Result<Appointment, AppError> {
        let appointment = self.get(business_id, appointment_id).await?;
        ensure_transition(&appointment, status)?;

        let changed_by = changed_by.unwrap_or_else(|| DEFAULT_CHANGED_BY.to_string());
        let closed = self.appointment_repo.close(&appointment, status, &changed_by, notes).await?;
        info!(appointment_id = %closed.id, status = closed.status.as_str(), "appointment closed");
        Ok(closed)
    }
}

fn ensure_transition(appointment: &Appointment, next: AppointmentStatus) -> Result<(), AppError> {
    if appointment.status.can_transition_to(next) {
        return Ok(());
    }
    let message = match (appointment.status, next) {
        (AppointmentStatus::Cancelled, AppointmentStatus::Cancelled) => {
            format!("Appointment {} is already cancelled", appointment.id)
        }
        (AppointmentStatus::Cancelled, AppointmentStatus::Scheduled) => {
            format!("Cannot reschedule cancelled appointment {}", appointment.id)
        }
        (current, next) => format!(
            "Appointment {} is {} and cannot become {}",
            appointment.id, current.as_str(), next.as_str()
        ),
    };
    Err(AppError::InvalidTransition(message))
}
