use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::info;

use crate::domain::models::exception::{AvailabilityException, ExceptionType, TimeOffPeriod};
use crate::domain::ports::{AvailabilityExceptionRepository, StaffDirectory};
use crate::domain::services::{
    calendar::normalize_time,
    require_business_staff,
    slot_compiler::{RefreshReport, SlotCompiler},
    time_off::{expand_range, group_periods},
};
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct ExceptionChange {
    pub exceptions: Vec<AvailabilityException>,
    pub refresh: RefreshReport,
}

pub struct ExceptionRequest {
    pub date: NaiveDate,
    pub exception_type: ExceptionType,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
}

/// Date overrides and time off. Every change re-syncs the materialized slots
/// so that free slots on newly closed dates disappear.
pub struct ExceptionService {
    staff_directory: Arc<dyn StaffDirectory>,
    exception_repo: Arc<dyn AvailabilityExceptionRepository>,
    slot_compiler: Arc<SlotCompiler>,
    horizon_days: u32,
}

impl ExceptionService {
    pub fn new(
        staff_directory: Arc<dyn StaffDirectory>,
        exception_repo: Arc<dyn AvailabilityExceptionRepository>,
        slot_compiler: Arc<SlotCompiler>,
        horizon_days: u32,
    ) -> Self {
        Self { staff_directory, exception_repo, slot_compiler, horizon_days }
    }

    pub async fn upsert_exception(&self, business_id: &str, staff_id: &str, request: ExceptionRequest) -> Result<ExceptionChange, AppError> {
        let staff = require_business_staff(self.staff_directory.as_ref(), business_id, staff_id).await?;

        let (start_time, end_time) = match request.exception_type {
            ExceptionType::CustomHours => {
                let start = request.start_time.map(normalize_time);
                let end = request.end_time.map(normalize_time);
                if start.is_none() && end.is_none() {
                    return Err(AppError::Validation("custom_hours requires start_time or end_time".into()));
                }
                if let (Some(s), Some(e)) = (start, end)
                    && s >= e
                {
                    return Err(AppError::Validation("start_time must be before end_time".into()));
                }
                (start, end)
            }
            ExceptionType::Closed | ExceptionType::TimeOff => (None, None),
        };

        let exception = AvailabilityException::new(staff.id.clone(), request.date, request.exception_type)
            .with_hours(start_time, end_time)
            .with_reason(request.reason);

        let saved = self.exception_repo.upsert(&exception).await?;
        info!(staff_id = %staff.id, date = %saved.exception_date, kind = ?saved.exception_type, "exception saved");

        let refresh = self.refresh(&staff.id).await?;
        Ok(ExceptionChange { exceptions: vec![saved], refresh })
    }

    pub async fn delete_exception(&self, business_id: &str, staff_id: &str, date: NaiveDate) -> Result<RefreshReport, AppError> {
        let staff = require_business_staff(self.staff_directory.as_ref(), business_id, staff_id).await?;
        self.exception_repo.delete(&staff.id, date).await?;
        info!(staff_id = %staff.id, %date, "exception deleted");
        self.refresh(&staff.id).await
    }

    pub async fn list_exceptions(
        &self,
        business_id: &str,
        staff_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AvailabilityException>, AppError> {
        if end < start {
            return Err(AppError::Validation("end date must not be before start date".into()));
        }
        let staff = require_business_staff(self.staff_directory.as_ref(), business_id, staff_id).await?;
        self.exception_repo.list_by_range(&staff.id, start, end).await
    }

    /// Stores one row per date of `[start, end]` in a single transaction.
    pub async fn add_time_off(
        &self,
        business_id: &str,
        staff_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        exception_type: ExceptionType,
        reason: Option<String>,
    ) -> Result<ExceptionChange, AppError> {
        let staff = require_business_staff(self.staff_directory.as_ref(), business_id, staff_id).await?;
        let rows = expand_range(&staff.id, start, end, exception_type, reason)?;

        let saved = self.exception_repo.upsert_many(&rows).await?;
        info!(staff_id = %staff.id, %start, %end, days = saved.len(), "time off recorded");

        let refresh = self.refresh(&staff.id).await?;
        Ok(ExceptionChange { exceptions: saved, refresh })
    }

    pub async fn remove_time_off(&self, business_id: &str, staff_id: &str, start: NaiveDate, end: NaiveDate) -> Result<RefreshReport, AppError> {
        if end < start {
            return Err(AppError::Validation("end date must not be before start date".into()));
        }
        let staff = require_business_staff(self.staff_directory.as_ref(), business_id, staff_id).await?;
        let removed = self.exception_repo.delete_range(&staff.id, start, end).await?;
        if removed == 0 {
            return Err(AppError::NotFound(format!("No exceptions between {} and {}", start, end)));
        }
        info!(staff_id = %staff.id, %start, %end, removed, "time off removed");
        self.refresh(&staff.id).await
    }

    /// Whole-day exceptions from `from` onwards, grouped into periods.
    pub async fn list_time_off(&self, business_id: &str, staff_id: &str, from: Option<NaiveDate>) -> Result<Vec<TimeOffPeriod>, AppError> {
        let staff = require_business_staff(self.staff_directory.as_ref(), business_id, staff_id).await?;
        let from = from.unwrap_or_else(|| self.slot_compiler.today());
        let rows: Vec<AvailabilityException> = self.exception_repo.list_from(&staff.id, from).await?
            .into_iter()
            .filter(AvailabilityException::removes_whole_day)
            .collect();
        Ok(group_periods(&rows))
    }

    async fn refresh(&self, staff_id: &str) -> Result<RefreshReport, AppError> {
        self.slot_compiler
            .refresh_slots(staff_id, self.slot_compiler.today(), self.horizon_days)
            .await
    }
}
