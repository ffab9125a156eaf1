use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use crate::error::AppError;

pub const SUNDAY: i32 = 0;
pub const SATURDAY: i32 = 6;

const DAY_NAMES: [&str; 7] = ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];

/// Day-of-week number used across templates, business hours and slot generation:
/// 0=Sunday..6=Saturday.
pub fn day_of_week(date: NaiveDate) -> i32 {
    match date.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

pub fn is_valid_day(day: i32) -> bool {
    (SUNDAY..=SATURDAY).contains(&day)
}

pub fn day_name(day: i32) -> &'static str {
    usize::try_from(day)
        .ok()
        .and_then(|idx| DAY_NAMES.get(idx).copied())
        .unwrap_or("Unknown day")
}

/// Accepts `H:MM`, `HH:MM` and `HH:MM:SS` and returns the time truncated to whole minutes.
pub fn parse_time(raw: &str) -> Result<NaiveTime, AppError> {
    let trimmed = raw.trim();
    let parsed = NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| AppError::Validation(format!("Invalid time '{}' (expected HH:MM)", raw)))?;
    Ok(normalize_time(parsed))
}

pub fn normalize_time(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date '{}' (expected YYYY-MM-DD)", raw)))
}

/// Canonical zero-padded `HH:MM`.
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn minutes_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

pub fn time_from_minutes(minutes: i64) -> Option<NaiveTime> {
    if !(0..24 * 60).contains(&minutes) {
        return None;
    }
    NaiveTime::from_hms_opt((minutes / 60) as u32, (minutes % 60) as u32, 0)
}

/// `[start, start + days)`
pub fn horizon(start: NaiveDate, days: u32) -> impl Iterator<Item = NaiveDate> {
    (0..i64::from(days)).map(move |offset| start + Duration::days(offset))
}

pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}
