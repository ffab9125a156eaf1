use crate::domain::models::{
    appointment::{Appointment, AppointmentHistoryEntry, AppointmentStatus, NewAppointment, RescheduleTarget},
    availability::AvailabilityTemplate,
    business_hours::BusinessHours,
    exception::AvailabilityException,
    slot::TimeSlot,
    staff::Staff,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

/// Staff records are owned by the staff-management collaborator.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn get_staff(&self, staff_id: &str) -> Result<Option<Staff>, AppError>;
    async fn list_schedulable(&self) -> Result<Vec<Staff>, AppError>;
}

#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn customer_exists(&self, customer_id: &str, business_id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait BusinessHoursRepository: Send + Sync {
    async fn list_for_business(&self, business_id: &str) -> Result<Vec<BusinessHours>, AppError>;
    async fn replace(&self, business_id: &str, hours: &[BusinessHours]) -> Result<Vec<BusinessHours>, AppError>;
}

#[async_trait]
pub trait AvailabilityTemplateRepository: Send + Sync {
    async fn list_active(&self, staff_id: &str) -> Result<Vec<AvailabilityTemplate>, AppError>;
    /// Deactivates every current template of the staff member and activates `templates`, in one transaction.
    async fn replace_active(&self, staff_id: &str, templates: &[AvailabilityTemplate]) -> Result<Vec<AvailabilityTemplate>, AppError>;
}

#[async_trait]
pub trait AvailabilityExceptionRepository: Send + Sync {
    async fn upsert(&self, exception: &AvailabilityException) -> Result<AvailabilityException, AppError>;
    /// All-or-nothing upsert of several dates.
    async fn upsert_many(&self, exceptions: &[AvailabilityException]) -> Result<Vec<AvailabilityException>, AppError>;
    /// Inclusive on both ends, ordered by date.
    async fn list_by_range(&self, staff_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<AvailabilityException>, AppError>;
    async fn list_from(&self, staff_id: &str, start: NaiveDate) -> Result<Vec<AvailabilityException>, AppError>;
    async fn delete(&self, staff_id: &str, date: NaiveDate) -> Result<(), AppError>;
    async fn delete_range(&self, staff_id: &str, start: NaiveDate, end: NaiveDate) -> Result<u64, AppError>;
}

/// Storage side of the slot allocator. `reserve`, `release` and `set_blocked` are
/// single conditional updates; no read-then-write.
#[async_trait]
pub trait SlotRepository: Send + Sync {
    /// Inserts slots whose (staff_id, date, time) is not taken yet; returns how many were new.
    async fn insert_missing(&self, slots: &[TimeSlot]) -> Result<u64, AppError>;
    async fn find_by_id(&self, slot_id: &str) -> Result<Option<TimeSlot>, AppError>;
    async fn find_by_key(&self, staff_id: &str, date: NaiveDate, time: NaiveTime) -> Result<Option<TimeSlot>, AppError>;
    /// Every slot in the inclusive date range, ordered by date then time.
    async fn list_by_range(&self, staff_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<TimeSlot>, AppError>;
    /// Unbooked, unblocked slots in the inclusive date range, ordered by date then time.
    async fn list_available(&self, staff_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<TimeSlot>, AppError>;
    /// `None` when the slot does not exist or is already booked or blocked.
    async fn reserve(&self, staff_id: &str, date: NaiveDate, time: NaiveTime) -> Result<Option<TimeSlot>, AppError>;
    /// `None` when the slot does not exist. Releasing a free slot is a no-op.
    async fn release(&self, slot_id: &str) -> Result<Option<TimeSlot>, AppError>;
    /// `None` when the slot does not exist, is booked or is retired.
    async fn set_blocked(&self, slot_id: &str, blocked: bool) -> Result<Option<TimeSlot>, AppError>;
    /// Deletes the given slots if they are still free, unblocked and never referenced by an appointment.
    async fn delete_unused(&self, slot_ids: &[String]) -> Result<u64, AppError>;
    /// Blocks the given slots whether booked or not and marks them retired.
    async fn retire(&self, slot_ids: &[String]) -> Result<u64, AppError>;
    /// Clears the block on retired slots.
    async fn restore(&self, slot_ids: &[String]) -> Result<u64, AppError>;
}

/// Every mutating method runs as one database transaction covering the slot
/// update, the appointment row and its history entry.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Reserves the (staff_id, date, time) slot and inserts the appointment plus its `created` entry.
    async fn book(&self, draft: &NewAppointment) -> Result<Appointment, AppError>;
    async fn find_by_id(&self, business_id: &str, id: &str) -> Result<Option<Appointment>, AppError>;
    async fn list_by_staff(&self, staff_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Appointment>, AppError>;
    async fn cancel(&self, appointment: &Appointment, reason: Option<String>, changed_by: &str) -> Result<Appointment, AppError>;
    /// Reserves the target slot first; the old slot is released only once that succeeded.
    async fn reschedule(&self, appointment: &Appointment, target: &RescheduleTarget, changed_by: &str) -> Result<Appointment, AppError>;
    /// Moves a scheduled appointment to `completed` or `no_show`.
    async fn close(&self, appointment: &Appointment, status: AppointmentStatus, changed_by: &str, notes: Option<String>) -> Result<Appointment, AppError>;
    async fn list_history(&self, appointment_id: &str) -> Result<Vec<AppointmentHistoryEntry>, AppError>;
}
