use std::collections::BTreeMap;

use crate::domain::models::{
    availability::{IssueCode, ProposedScheduleEntry, ScheduleIssue, ScheduleValidation},
    business_hours::BusinessHours,
};
use crate::domain::services::calendar::{day_name, format_hhmm, is_valid_day};

fn issue(day_of_week: i32, code: IssueCode, message: String) -> ScheduleIssue {
    ScheduleIssue { day_of_week, code, message }
}

/// Checks every working entry against the business hours of the same weekday.
///
/// A closed day or a boundary outside opening hours is an error; a weekday
/// without a business-hours row is only a warning. Times are compared as
/// `NaiveTime`, never as strings.
pub fn validate_schedule(entries: &[ProposedScheduleEntry], business_hours: &[BusinessHours]) -> ScheduleValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let hours_by_day: BTreeMap<i32, &BusinessHours> =
        business_hours.iter().map(|h| (h.day_of_week, h)).collect();
    let mut ranges_by_day: BTreeMap<i32, Vec<&ProposedScheduleEntry>> = BTreeMap::new();

    for entry in entries.iter().filter(|e| e.is_working) {
        let day = entry.day_of_week;
        if !is_valid_day(day) {
            errors.push(issue(day, IssueCode::InvalidDay, format!("Day {} is not between 0 (Sunday) and 6 (Saturday)", day)));
            continue;
        }
        let name = day_name(day);

        if entry.start_time >= entry.end_time {
            errors.push(issue(day, IssueCode::InvalidRange, format!(
                "{}: start {} must be before end {}",
                name, format_hhmm(entry.start_time), format_hhmm(entry.end_time)
            )));
            continue;
        }
        if entry.slot_duration_minutes <= 0 {
            errors.push(issue(day, IssueCode::InvalidSlotDuration, format!(
                "{}: slot duration must be positive, got {}", name, entry.slot_duration_minutes
            )));
        }
        ranges_by_day.entry(day).or_default().push(entry);

        let Some(hours) = hours_by_day.get(&day) else {
            warnings.push(issue(day, IssueCode::NoBusinessHours, format!(
                "{}: no business hours configured, staff availability will be used unconstrained", name
            )));
            continue;
        };

        if !hours.is_open {
            errors.push(issue(day, IssueCode::BusinessClosed, format!("{}: business is closed", name)));
            continue;
        }

        let (Some(open), Some(close)) = (hours.open_time, hours.close_time) else {
            warnings.push(issue(day, IssueCode::NoBusinessHours, format!(
                "{}: business is open but has no opening times, staff availability will be used unconstrained", name
            )));
            continue;
        };

        if entry.start_time < open {
            errors.push(issue(day, IssueCode::StartsBeforeOpen, format!(
                "{}: staff start {} is before business opening time {}",
                name, format_hhmm(entry.start_time), format_hhmm(open)
            )));
        }
        if entry.end_time > close {
            errors.push(issue(day, IssueCode::EndsAfterClose, format!(
                "{}: staff end {} is after business closing time {}",
                name, format_hhmm(entry.end_time), format_hhmm(close)
            )));
        }
    }

    for (day, mut ranges) in ranges_by_day {
        ranges.sort_by_key(|e| e.start_time);
        for pair in ranges.windows(2) {
            if pair[1].start_time < pair[0].end_time {
                errors.push(issue(day, IssueCode::Overlap, format!(
                    "{}: {}-{} overlaps {}-{}",
                    day_name(day),
                    format_hhmm(pair[0].start_time), format_hhmm(pair[0].end_time),
                    format_hhmm(pair[1].start_time), format_hhmm(pair[1].end_time)
                )));
            }
        }
    }

    ScheduleValidation::from_issues(errors, warnings)
}
