pub mod appointments;
pub mod business_hours;
pub mod exceptions;
pub mod health;
pub mod schedule;
pub mod slots;

use std::collections::HashMap;
use chrono::NaiveDate;

use crate::domain::services::calendar::parse_date;
use crate::error::AppError;

pub(crate) fn required_date(params: &HashMap<String, String>, key: &str) -> Result<NaiveDate, AppError> {
    let raw = params.get(key).ok_or_else(|| AppError::Validation(format!("{} required", key)))?;
    parse_date(raw)
}

pub(crate) fn optional_date(params: &HashMap<String, String>, key: &str) -> Result<Option<NaiveDate>, AppError> {
    params.get(key).map(|raw| parse_date(raw)).transpose()
}
