use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::models::{
    availability::{AvailabilityTemplate, ProposedScheduleEntry, ScheduleValidation},
    business_hours::BusinessHours,
};
use crate::domain::ports::{AvailabilityTemplateRepository, BusinessHoursRepository, StaffDirectory};
use crate::domain::services::{
    calendar::is_valid_day,
    require_business_staff,
    schedule_validator::validate_schedule,
    slot_compiler::{RefreshReport, SlotCompiler},
};
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct CommittedSchedule {
    pub templates: Vec<AvailabilityTemplate>,
    pub validation: ScheduleValidation,
    pub refresh: RefreshReport,
}

/// Weekly schedules of staff members, checked against the business's opening hours.
pub struct ScheduleService {
    staff_directory: Arc<dyn StaffDirectory>,
    business_hours_repo: Arc<dyn BusinessHoursRepository>,
    template_repo: Arc<dyn AvailabilityTemplateRepository>,
    slot_compiler: Arc<SlotCompiler>,
    horizon_days: u32,
}

impl ScheduleService {
    pub fn new(
        staff_directory: Arc<dyn StaffDirectory>,
        business_hours_repo: Arc<dyn BusinessHoursRepository>,
        template_repo: Arc<dyn AvailabilityTemplateRepository>,
        slot_compiler: Arc<SlotCompiler>,
        horizon_days: u32,
    ) -> Self {
        Self { staff_directory, business_hours_repo, template_repo, slot_compiler, horizon_days }
    }

    pub async fn validate_schedule(
        &self,
        business_id: &str,
        staff_id: &str,
        proposed: &[ProposedScheduleEntry],
    ) -> Result<ScheduleValidation, AppError> {
        let staff = require_business_staff(self.staff_directory.as_ref(), business_id, staff_id).await?;
        let hours = self.business_hours_repo.list_for_business(&staff.business_id).await?;
        let report = validate_schedule(proposed, &hours);

        info!(
            staff_id = %staff.id,
            is_valid = report.is_valid,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "schedule validated"
        );
        Ok(report)
    }

    /// Validates, then atomically swaps the staff member's active templates and
    /// refreshes the materialized slots over the configured horizon.
    pub async fn commit_schedule(
        &self,
        business_id: &str,
        staff_id: &str,
        proposed: Vec<ProposedScheduleEntry>,
    ) -> Result<CommittedSchedule, AppError> {
        let validation = self.validate_schedule(business_id, staff_id, &proposed).await?;
        if !validation.is_valid {
            warn!(staff_id, errors = validation.errors.len(), "schedule commit rejected");
            return Err(AppError::ValidationFailed(validation));
        }

        let templates: Vec<AvailabilityTemplate> = proposed
            .into_iter()
            .filter(|entry| entry.is_working)
            .map(|entry| entry.into_template(staff_id))
            .collect();

        let saved = self.template_repo.replace_active(staff_id, &templates).await?;
        info!(staff_id, templates = saved.len(), "schedule committed");

        let refresh = self.slot_compiler
            .refresh_slots(staff_id, self.slot_compiler.today(), self.horizon_days)
            .await?;

        Ok(CommittedSchedule { templates: saved, validation, refresh })
    }

    pub async fn get_schedule(&self, business_id: &str, staff_id: &str) -> Result<Vec<AvailabilityTemplate>, AppError> {
        let staff = require_business_staff(self.staff_directory.as_ref(), business_id, staff_id).await?;
        self.template_repo.list_active(&staff.id).await
    }

    pub async fn business_hours(&self, business_id: &str) -> Result<Vec<BusinessHours>, AppError> {
        self.business_hours_repo.list_for_business(business_id).await
    }

    /// Configuration entry point for the business-hours collaborator.
    pub async fn replace_business_hours(&self, business_id: &str, hours: Vec<BusinessHours>) -> Result<Vec<BusinessHours>, AppError> {
        let mut seen = [false; 7];
        for row in &hours {
            if !is_valid_day(row.day_of_week) {
                return Err(AppError::Validation(format!("Invalid day_of_week {}", row.day_of_week)));
            }
            let idx = row.day_of_week as usize;
            if seen[idx] {
                return Err(AppError::Validation(format!("Duplicate business hours for day {}", row.day_of_week)));
            }
            seen[idx] = true;

            if row.is_open
                && let (Some(open), Some(close)) = (row.open_time, row.close_time)
                && open >= close
            {
                return Err(AppError::Validation(format!("Opening time must be before closing time on day {}", row.day_of_week)));
            }
        }

        let saved = self.business_hours_repo.replace(business_id, &hours).await?;
        info!(business_id, days = saved.len(), "business hours replaced");
        Ok(saved)
    }
}
