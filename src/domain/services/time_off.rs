use chrono::{Duration, NaiveDate};

use crate::domain::models::exception::{AvailabilityException, ExceptionType, TimeOffPeriod};
use crate::error::AppError;

/// Longest range accepted in a single time-off request.
pub const MAX_TIME_OFF_DAYS: i64 = 366;

/// Groups per-date exception rows into maximal runs of consecutive dates that
/// share type and reason. Input order does not matter.
pub fn group_periods(exceptions: &[AvailabilityException]) -> Vec<TimeOffPeriod> {
    let mut rows: Vec<&AvailabilityException> = exceptions.iter().collect();
    rows.sort_by_key(|e| e.exception_date);

    let mut periods: Vec<TimeOffPeriod> = Vec::new();
    for row in rows {
        if let Some(current) = periods.last_mut()
            && current.end_date.succ_opt() == Some(row.exception_date)
            && current.exception_type == row.exception_type
            && current.reason == row.reason
        {
            current.end_date = row.exception_date;
            continue;
        }
        periods.push(TimeOffPeriod {
            start_date: row.exception_date,
            end_date: row.exception_date,
            exception_type: row.exception_type,
            reason: row.reason.clone(),
        });
    }
    periods
}

/// One exception row per date in `[start, end]`.
pub fn expand_range(
    staff_id: &str,
    start: NaiveDate,
    end: NaiveDate,
    exception_type: ExceptionType,
    reason: Option<String>,
) -> Result<Vec<AvailabilityException>, AppError> {
    if end < start {
        return Err(AppError::Validation("end_date must not be before start_date".into()));
    }
    if exception_type == ExceptionType::CustomHours {
        return Err(AppError::Validation("Time off must be of type closed or time_off".into()));
    }
    let days = (end - start).num_days() + 1;
    if days > MAX_TIME_OFF_DAYS {
        return Err(AppError::Validation(format!("Time off may span at most {} days", MAX_TIME_OFF_DAYS)));
    }

    Ok((0..days)
        .map(|offset| {
            AvailabilityException::new(staff_id.to_string(), start + Duration::days(offset), exception_type)
                .with_reason(reason.clone())
        })
        .collect())
}
