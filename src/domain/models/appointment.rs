use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::models::slot::TimeSlot;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, AppointmentStatus::Scheduled)
    }

    /// `scheduled -> scheduled` is a reschedule; every other edge leaves `scheduled` for good.
    pub fn can_transition_to(self, _next: AppointmentStatus) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
        }
    }
}

/// Marker for the external calendar-sync collaborator.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum SyncStatus {
    Pending,
    Synced,
    Failed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum HistoryChangeType {
    Created,
    Rescheduled,
    Cancelled,
    Completed,
    NoShow,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Appointment {
    pub id: String,
    pub business_id: String,
    pub customer_id: String,
    pub staff_id: String,
    pub service_id: Option<String>,
    pub slot_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub created_via: String,
    pub cancellation_reason: Option<String>,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A booking request that has passed directory checks but holds no slot yet.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub business_id: String,
    pub customer_id: String,
    pub staff_id: String,
    pub service_id: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i32,
    pub created_via: String,
    pub changed_by: String,
}

impl Appointment {
    pub fn from_reservation(draft: &NewAppointment, slot: &TimeSlot) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            business_id: draft.business_id.clone(),
            customer_id: draft.customer_id.clone(),
            staff_id: slot.staff_id.clone(),
            service_id: draft.service_id.clone(),
            slot_id: slot.id.clone(),
            date: slot.date,
            time: slot.time,
            duration_minutes: draft.duration_minutes,
            status: AppointmentStatus::Scheduled,
            created_via: draft.created_via.clone(),
            cancellation_reason: None,
            sync_status: SyncStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RescheduleTarget {
    pub staff_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Append-only audit record, one per state transition.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AppointmentHistoryEntry {
    pub id: String,
    pub appointment_id: String,
    pub changed_by: String,
    pub change_type: HistoryChangeType,
    pub old_date: Option<NaiveDate>,
    pub old_time: Option<NaiveTime>,
    pub new_date: Option<NaiveDate>,
    pub new_time: Option<NaiveTime>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AppointmentHistoryEntry {
    fn base(appointment_id: &str, changed_by: &str, change_type: HistoryChangeType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            appointment_id: appointment_id.to_string(),
            changed_by: changed_by.to_string(),
            change_type,
            old_date: None,
            old_time: None,
            new_date: None,
            new_time: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    pub fn created(appointment: &Appointment, changed_by: &str) -> Self {
        Self {
            new_date: Some(appointment.date),
            new_time: Some(appointment.time),
            ..Self::base(&appointment.id, changed_by, HistoryChangeType::Created)
        }
    }

    pub fn rescheduled(before: &Appointment, after: &Appointment, changed_by: &str) -> Self {
        let notes = (before.staff_id != after.staff_id)
            .then(|| format!("staff changed from {} to {}", before.staff_id, after.staff_id));
        Self {
            old_date: Some(before.date),
            old_time: Some(before.time),
            new_date: Some(after.date),
            new_time: Some(after.time),
            notes,
            ..Self::base(&before.id, changed_by, HistoryChangeType::Rescheduled)
        }
    }

    pub fn cancelled(appointment: &Appointment, changed_by: &str, reason: Option<String>) -> Self {
        Self {
            old_date: Some(appointment.date),
            old_time: Some(appointment.time),
            notes: reason,
            ..Self::base(&appointment.id, changed_by, HistoryChangeType::Cancelled)
        }
    }

    /// Terminal close-out (`completed` / `no_show`); date and time stay as they were.
    pub fn closed(appointment: &Appointment, change_type: HistoryChangeType, changed_by: &str, notes: Option<String>) -> Self {
        Self {
            old_date: Some(appointment.date),
            old_time: Some(appointment.time),
            notes,
            ..Self::base(&appointment.id, changed_by, change_type)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_scheduled_can_transition() {
        use AppointmentStatus::*;
        for next in [Scheduled, Completed, Cancelled, NoShow] {
            assert!(Scheduled.can_transition_to(next));
            assert!(!Completed.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
            assert!(!NoShow.can_transition_to(next));
        }
        assert!(!Scheduled.is_terminal());
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn test_rescheduled_entry_carries_both_times() {
        let slot = TimeSlot::new(
            "s1".into(), "b1".into(),
            NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(), 30,
        );
        let draft = NewAppointment {
            business_id: "b1".into(),
            customer_id: "c1".into(),
            staff_id: "s1".into(),
            service_id: None,
            date: slot.date,
            time: slot.time,
            duration_minutes: 30,
            created_via: "api".into(),
            changed_by: "tester".into(),
        };
        let before = Appointment::from_reservation(&draft, &slot);
        let mut after = before.clone();
        after.time = NaiveTime::from_hms_opt(10, 0, 0).unwrap();

        let entry = AppointmentHistoryEntry::rescheduled(&before, &after, "tester");
        assert_eq!(entry.change_type, HistoryChangeType::Rescheduled);
        assert_eq!(entry.old_time, Some(before.time));
        assert_eq!(entry.new_time, Some(after.time));
        assert!(entry.notes.is_none());
    }
}
