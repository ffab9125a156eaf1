use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::models::slot::TimeSlot;
use crate::domain::services::calendar::format_hhmm;

#[derive(Serialize)]
pub struct SlotResponse {
    pub id: String,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: i32,
    pub is_booked: bool,
    pub is_blocked: bool,
}

impl From<TimeSlot> for SlotResponse {
    fn from(slot: TimeSlot) -> Self {
        Self {
            id: slot.id,
            date: slot.date,
            time: format_hhmm(slot.time),
            duration_minutes: slot.duration_minutes,
            is_booked: slot.is_booked,
            is_blocked: slot.is_blocked,
        }
    }
}

#[derive(Serialize)]
pub struct AvailableSlotsResponse {
    pub staff_id: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub slots: Vec<SlotResponse>,
}
