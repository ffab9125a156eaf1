use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

/// Atomic bookable unit, unique per (staff_id, date, time).
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct TimeSlot {
    pub id: String,
    pub staff_id: String,
    pub business_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i32,
    pub is_booked: bool,
    pub is_blocked: bool,
    /// Set together with `is_blocked` when the current templates no longer produce this slot.
    pub is_retired: bool,
    pub created_at: DateTime<Utc>,
}

impl TimeSlot {
    pub fn new(staff_id: String, business_id: String, date: NaiveDate, time: NaiveTime, duration_minutes: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            staff_id,
            business_id,
            date,
            time,
            duration_minutes,
            is_booked: false,
            is_blocked: false,
            is_retired: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_available(&self) -> bool {
        !self.is_booked && !self.is_blocked
    }

    pub fn key(&self) -> (NaiveDate, NaiveTime) {
        (self.date, self.time)
    }

    /// An appointment holds exactly one slot and may not run past its end.
    pub fn ensure_fits(&self, duration_minutes: i32) -> Result<(), AppError> {
        if duration_minutes > self.duration_minutes {
            return Err(AppError::Validation(format!(
                "{} minute appointment does not fit the {} minute slot at {} {}",
                duration_minutes, self.duration_minutes, self.date, self.time.format("%H:%M")
            )));
        }
        Ok(())
    }
}
