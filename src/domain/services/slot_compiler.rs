use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{Days, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::models::{
    availability::AvailabilityTemplate,
    exception::{AvailabilityException, ExceptionType},
    slot::TimeSlot,
    staff::Staff,
};
use crate::domain::ports::{
    AvailabilityExceptionRepository, AvailabilityTemplateRepository, SlotRepository, StaffDirectory,
};
use crate::domain::services::calendar::{self, day_of_week, minutes_of_day, time_from_minutes};
use crate::domain::services::require_staff;
use crate::error::AppError;

/// Longest horizon a single generation or refresh may cover.
pub const MAX_HORIZON_DAYS: u32 = 366;

/// Exclusive end of `[start, start + days)`, bounded by [`MAX_HORIZON_DAYS`].
pub fn horizon_end(start: NaiveDate, days: u32) -> Result<NaiveDate, AppError> {
    if days > MAX_HORIZON_DAYS {
        return Err(AppError::Validation(format!("horizon may cover at most {} days", MAX_HORIZON_DAYS)));
    }
    start
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| AppError::Validation(format!("horizon starting {} runs past the calendar", start)))
}

/// Expands templates and exceptions into candidate slots for `[start, start + days)`.
///
/// Per date: a `closed` or `time_off` exception drops the date, a `custom_hours`
/// exception replaces the window of every template on that weekday. Each window is
/// walked in `slot_duration_minutes` steps and a slot is emitted while its end stays
/// within the window. Output is ordered by (date, time) with no duplicate keys.
pub fn compile_slots(
    staff: &Staff,
    templates: &[AvailabilityTemplate],
    exceptions: &[AvailabilityException],
    start: NaiveDate,
    days: u32,
) -> Vec<TimeSlot> {
    let by_date: HashMap<NaiveDate, &AvailabilityException> = exceptions
        .iter()
        .filter(|e| e.staff_id == staff.id)
        .map(|e| (e.exception_date, e))
        .collect();

    let mut slots: BTreeMap<(NaiveDate, NaiveTime), TimeSlot> = BTreeMap::new();

    for date in calendar::horizon(start, days) {
        let exception = by_date.get(&date).copied();
        if exception.is_some_and(|e| e.removes_whole_day()) {
            continue;
        }

        let weekday = day_of_week(date);
        for template in templates.iter().filter(|t| t.active && t.day_of_week == weekday) {
            let (window_start, window_end) = match exception {
                Some(e) if e.exception_type == ExceptionType::CustomHours => (
                    e.start_time.unwrap_or(template.start_time),
                    e.end_time.unwrap_or(template.end_time),
                ),
                _ => (template.start_time, template.end_time),
            };

            let step = i64::from(template.slot_duration_minutes);
            if step <= 0 {
                continue;
            }

            let end = minutes_of_day(window_end);
            let mut cursor = minutes_of_day(window_start);
            while cursor + step <= end {
                if let Some(time) = time_from_minutes(cursor) {
                    slots.entry((date, time)).or_insert_with(|| {
                        TimeSlot::new(
                            staff.id.clone(),
                            staff.business_id.clone(),
                            date,
                            time,
                            template.slot_duration_minutes,
                        )
                    });
                }
                cursor += step;
            }
        }
    }

    slots.into_values().collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub staff_id: String,
    pub start_date: NaiveDate,
    /// Exclusive.
    pub end_date: NaiveDate,
    pub candidates: usize,
    pub inserted: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub generation: GenerationReport,
    pub removed: u64,
    /// Stale slots that could not be deleted and were blocked instead.
    pub retired: u64,
    /// Retired slots that are produced again and were unblocked.
    pub restored: u64,
    /// Booked slots that the current templates and exceptions no longer produce.
    pub conflicts: Vec<TimeSlot>,
}

pub struct SlotCompiler {
    staff_directory: Arc<dyn StaffDirectory>,
    template_repo: Arc<dyn AvailabilityTemplateRepository>,
    exception_repo: Arc<dyn AvailabilityExceptionRepository>,
    slot_repo: Arc<dyn SlotRepository>,
    timezone: Tz,
}

impl SlotCompiler {
    pub fn new(
        staff_directory: Arc<dyn StaffDirectory>,
        template_repo: Arc<dyn AvailabilityTemplateRepository>,
        exception_repo: Arc<dyn AvailabilityExceptionRepository>,
        slot_repo: Arc<dyn SlotRepository>,
        timezone: Tz,
    ) -> Self {
        Self { staff_directory, template_repo, exception_repo, slot_repo, timezone }
    }

    pub fn today(&self) -> NaiveDate {
        calendar::today_in(self.timezone)
    }

    /// Idempotent materialization of `[today, today + days_ahead)`.
    pub async fn generate_slots(&self, staff_id: &str, days_ahead: u32) -> Result<GenerationReport, AppError> {
        self.generate_from(staff_id, self.today(), days_ahead).await
    }

    /// Append-only: existing rows, booked or not, are left exactly as they are.
    pub async fn generate_from(&self, staff_id: &str, start: NaiveDate, days: u32) -> Result<GenerationReport, AppError> {
        let end_date = horizon_end(start, days)?;
        let staff = require_staff(self.staff_directory.as_ref(), staff_id).await?;
        let candidates = self.compile_for(&staff, start, days).await?;

        let inserted = if candidates.is_empty() {
            0
        } else {
            self.slot_repo.insert_missing(&candidates).await?
        };

        info!(
            staff_id = %staff.id,
            start = %start,
            days,
            candidates = candidates.len(),
            inserted,
            "slot generation finished"
        );

        Ok(GenerationReport {
            staff_id: staff.id,
            start_date: start,
            end_date,
            candidates: candidates.len(),
            inserted,
        })
    }

    /// Brings materialized slots in line with the current templates and exceptions:
    /// free slots that are no longer produced are deleted, missing ones inserted.
    /// Stale slots that cannot be deleted (booked, or once held by an appointment)
    /// are retired so they never become bookable again, and retired slots that
    /// are produced again are restored. Booked slots keep their appointment.
    pub async fn refresh_slots(&self, staff_id: &str, start: NaiveDate, days: u32) -> Result<RefreshReport, AppError> {
        let end_date = horizon_end(start, days)?;
        let staff = require_staff(self.staff_directory.as_ref(), staff_id).await?;
        let desired = self.compile_for(&staff, start, days).await?;
        let wanted: HashSet<(NaiveDate, NaiveTime)> = desired.iter().map(TimeSlot::key).collect();

        let existing = match end_date.pred_opt() {
            Some(last) if days > 0 => self.slot_repo.list_by_range(&staff.id, start, last).await?,
            _ => Vec::new(),
        };

        let mut revived = Vec::new();
        let mut stale = Vec::new();
        let mut conflicts = Vec::new();
        for slot in existing {
            if wanted.contains(&slot.key()) {
                if slot.is_retired {
                    revived.push(slot.id);
                }
            } else if slot.is_booked {
                conflicts.push(slot);
            } else {
                stale.push(slot.id);
            }
        }

        let removed = self.slot_repo.delete_unused(&stale).await?;
        let mut leftover = stale;
        leftover.extend(conflicts.iter().map(|slot| slot.id.clone()));
        let retired = self.slot_repo.retire(&leftover).await?;
        let restored = self.slot_repo.restore(&revived).await?;

        let inserted = if desired.is_empty() {
            0
        } else {
            self.slot_repo.insert_missing(&desired).await?
        };

        if !conflicts.is_empty() {
            warn!(
                staff_id = %staff.id,
                conflicts = conflicts.len(),
                "booked slots fall outside the refreshed availability"
            );
        }
        info!(staff_id = %staff.id, removed, retired, restored, inserted, "slot refresh finished");

        Ok(RefreshReport {
            generation: GenerationReport {
                staff_id: staff.id,
                start_date: start,
                end_date,
                candidates: desired.len(),
                inserted,
            },
            removed,
            retired,
            restored,
            conflicts,
        })
    }

    async fn compile_for(&self, staff: &Staff, start: NaiveDate, days: u32) -> Result<Vec<TimeSlot>, AppError> {
        if days == 0 {
            return Ok(Vec::new());
        }
        if !staff.is_schedulable() {
            debug!(staff_id = %staff.id, "staff inactive, nothing to compile");
            return Ok(Vec::new());
        }

        let last = horizon_end(start, days - 1)?;
        let templates = self.template_repo.list_active(&staff.id).await?;
        let exceptions = self.exception_repo.list_by_range(&staff.id, start, last).await?;

        Ok(compile_slots(staff, &templates, &exceptions, start, days))
    }
}
