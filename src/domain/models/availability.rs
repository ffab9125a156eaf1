use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Recurring weekly availability of one staff member on one day of the week.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AvailabilityTemplate {
    pub id: String,
    pub staff_id: String,
    /// 0=Sunday..6=Saturday
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_duration_minutes: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityTemplate {
    pub fn new(
        staff_id: String,
        day_of_week: i32,
        start_time: NaiveTime,
        end_time: NaiveTime,
        slot_duration_minutes: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            staff_id,
            day_of_week,
            start_time,
            end_time,
            slot_duration_minutes,
            active: true,
            created_at: Utc::now(),
        }
    }
}

/// One day of a weekly schedule that has not been committed yet.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProposedScheduleEntry {
    pub day_of_week: i32,
    pub is_working: bool,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub slot_duration_minutes: i32,
}

impl ProposedScheduleEntry {
    pub fn into_template(self, staff_id: &str) -> AvailabilityTemplate {
        AvailabilityTemplate::new(
            staff_id.to_string(),
            self.day_of_week,
            self.start_time,
            self.end_time,
            self.slot_duration_minutes,
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidDay,
    InvalidRange,
    InvalidSlotDuration,
    Overlap,
    BusinessClosed,
    StartsBeforeOpen,
    EndsAfterClose,
    NoBusinessHours,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScheduleIssue {
    pub day_of_week: i32,
    pub code: IssueCode,
    pub message: String,
}

/// Outcome of checking a proposed weekly schedule against business hours.
/// Always carries every problem found, never just the first one.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ScheduleValidation {
    pub is_valid: bool,
    pub errors: Vec<ScheduleIssue>,
    pub warnings: Vec<ScheduleIssue>,
}

impl ScheduleValidation {
    pub fn from_issues(errors: Vec<ScheduleIssue>, warnings: Vec<ScheduleIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}
