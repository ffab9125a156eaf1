use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::info;

use crate::domain::models::slot::TimeSlot;
use crate::domain::ports::{SlotRepository, StaffDirectory};
use crate::domain::services::{calendar::normalize_time, require_staff};
use crate::error::AppError;

/// Widest window a single availability query may cover.
pub const MAX_QUERY_DAYS: i64 = 92;

/// The only component that flips `is_booked` or `is_blocked` outside an appointment
/// transaction. Every mutation is a single conditional update in the repository.
pub struct SlotAllocator {
    slot_repo: Arc<dyn SlotRepository>,
    staff_directory: Arc<dyn StaffDirectory>,
}

impl SlotAllocator {
    pub fn new(slot_repo: Arc<dyn SlotRepository>, staff_directory: Arc<dyn StaffDirectory>) -> Self {
        Self { slot_repo, staff_directory }
    }

    /// Free slots in `[start, end]` ordered by date then time; `end` defaults to `start`.
    pub async fn find_available(&self, staff_id: &str, start: NaiveDate, end: Option<NaiveDate>) -> Result<Vec<TimeSlot>, AppError> {
        let end = end.unwrap_or(start);
        if end < start {
            return Err(AppError::Validation("end date must not be before start date".into()));
        }
        if (end - start).num_days() >= MAX_QUERY_DAYS {
            return Err(AppError::Validation(format!("date range may cover at most {} days", MAX_QUERY_DAYS)));
        }

        let staff = require_staff(self.staff_directory.as_ref(), staff_id).await?;
        if !staff.is_schedulable() {
            return Ok(Vec::new());
        }
        self.slot_repo.list_available(&staff.id, start, end).await
    }

    /// Fails closed with `SlotUnavailable` when the slot is missing, booked or blocked.
    pub async fn reserve(&self, staff_id: &str, date: NaiveDate, time: NaiveTime) -> Result<TimeSlot, AppError> {
        let time = normalize_time(time);
        match self.slot_repo.reserve(staff_id, date, time).await? {
            Some(slot) => {
                info!(slot_id = %slot.id, staff_id, %date, %time, "slot reserved");
                Ok(slot)
            }
            None => Err(AppError::SlotUnavailable(format!(
                "Slot {} {} is not available for staff {}", date, time.format("%H:%M"), staff_id
            ))),
        }
    }

    /// Idempotent: releasing a free slot succeeds without change.
    pub async fn release(&self, slot_id: &str) -> Result<TimeSlot, AppError> {
        let slot = self.slot_repo.release(slot_id).await?
            .ok_or_else(|| AppError::NotFound(format!("Slot {} not found", slot_id)))?;
        info!(slot_id, "slot released");
        Ok(slot)
    }

    pub async fn block(&self, business_id: &str, slot_id: &str) -> Result<TimeSlot, AppError> {
        self.set_blocked(business_id, slot_id, true).await
    }

    pub async fn unblock(&self, business_id: &str, slot_id: &str) -> Result<TimeSlot, AppError> {
        self.set_blocked(business_id, slot_id, false).await
    }

    async fn set_blocked(&self, business_id: &str, slot_id: &str, blocked: bool) -> Result<TimeSlot, AppError> {
        let existing = self.slot_repo.find_by_id(slot_id).await?
            .filter(|slot| slot.business_id == business_id)
            .ok_or_else(|| AppError::NotFound(format!("Slot {} not found", slot_id)))?;

        let updated = self.slot_repo.set_blocked(&existing.id, blocked).await?
            .ok_or_else(|| AppError::SlotUnavailable(format!("Slot {} is booked or no longer offered", slot_id)))?;

        info!(slot_id, blocked, "slot block flag updated");
        Ok(updated)
    }
}
