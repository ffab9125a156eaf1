use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum ExceptionType {
    Closed,
    CustomHours,
    TimeOff,
}

/// Date-specific override of a staff member's weekly templates.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AvailabilityException {
    pub id: String,
    pub staff_id: String,
    pub exception_date: NaiveDate,
    pub exception_type: ExceptionType,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityException {
    pub fn new(staff_id: String, exception_date: NaiveDate, exception_type: ExceptionType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            staff_id,
            exception_date,
            exception_type,
            start_time: None,
            end_time: None,
            reason: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_hours(mut self, start_time: Option<NaiveTime>, end_time: Option<NaiveTime>) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }

    /// Whether the date yields no slots at all.
    pub fn removes_whole_day(&self) -> bool {
        match self.exception_type {
            ExceptionType::Closed | ExceptionType::TimeOff => true,
            ExceptionType::CustomHours => false,
        }
    }
}

/// A maximal run of consecutive exception dates sharing the same type and reason.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TimeOffPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub exception_type: ExceptionType,
    pub reason: Option<String>,
}

impl TimeOffPeriod {
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}
