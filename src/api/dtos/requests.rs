use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::models::availability::ProposedScheduleEntry;
use crate::domain::models::business_hours::BusinessHours;
use crate::domain::models::exception::ExceptionType;
use crate::domain::services::calendar::parse_time;
use crate::error::AppError;

fn parse_optional_time(raw: Option<&str>) -> Result<Option<chrono::NaiveTime>, AppError> {
    raw.map(parse_time).transpose()
}

#[derive(Deserialize)]
pub struct BusinessHoursEntry {
    pub day_of_week: i32,
    pub is_open: bool,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
}

impl BusinessHoursEntry {
    pub fn into_model(self, business_id: &str) -> Result<BusinessHours, AppError> {
        Ok(BusinessHours::new(
            business_id.to_string(),
            self.day_of_week,
            self.is_open,
            parse_optional_time(self.open_time.as_deref())?,
            parse_optional_time(self.close_time.as_deref())?,
        ))
    }
}

#[derive(Deserialize)]
pub struct ReplaceBusinessHoursRequest {
    pub days: Vec<BusinessHoursEntry>,
}

#[derive(Deserialize)]
pub struct ScheduleEntryRequest {
    pub day_of_week: i32,
    #[serde(default = "default_true")]
    pub is_working: bool,
    pub start_time: String,
    pub end_time: String,
    pub slot_duration_minutes: i32,
}

fn default_true() -> bool { true }

impl TryFrom<ScheduleEntryRequest> for ProposedScheduleEntry {
    type Error = AppError;

    fn try_from(req: ScheduleEntryRequest) -> Result<Self, Self::Error> {
        Ok(ProposedScheduleEntry {
            day_of_week: req.day_of_week,
            is_working: req.is_working,
            start_time: parse_time(&req.start_time)?,
            end_time: parse_time(&req.end_time)?,
            slot_duration_minutes: req.slot_duration_minutes,
        })
    }
}

#[derive(Deserialize)]
pub struct ScheduleRequest {
    pub schedule: Vec<ScheduleEntryRequest>,
}

impl ScheduleRequest {
    pub fn into_entries(self) -> Result<Vec<ProposedScheduleEntry>, AppError> {
        self.schedule.into_iter().map(ProposedScheduleEntry::try_from).collect()
    }
}

#[derive(Deserialize)]
pub struct GenerateSlotsRequest {
    pub days_ahead: Option<u32>,
    pub start_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct ExceptionRequestBody {
    pub date: NaiveDate,
    pub exception_type: ExceptionType,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub reason: Option<String>,
}

impl ExceptionRequestBody {
    pub fn start(&self) -> Result<Option<chrono::NaiveTime>, AppError> {
        parse_optional_time(self.start_time.as_deref())
    }

    pub fn end(&self) -> Result<Option<chrono::NaiveTime>, AppError> {
        parse_optional_time(self.end_time.as_deref())
    }
}

#[derive(Deserialize)]
pub struct TimeOffRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub exception_type: Option<ExceptionType>,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct BookAppointmentRequest {
    pub customer_id: String,
    pub staff_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: i32,
    pub service_id: Option<String>,
    pub created_via: Option<String>,
    pub changed_by: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
    pub changed_by: Option<String>,
}

#[derive(Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_date: NaiveDate,
    pub new_time: String,
    pub new_staff_id: Option<String>,
    pub changed_by: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct CloseAppointmentRequest {
    pub changed_by: Option<String>,
    pub notes: Option<String>,
}
