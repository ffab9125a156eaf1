pub mod appointment_service;
pub mod calendar;
pub mod exception_service;
pub mod schedule_service;
pub mod schedule_validator;
pub mod slot_allocator;
pub mod slot_compiler;
pub mod time_off;

use crate::domain::models::staff::Staff;
use crate::domain::ports::StaffDirectory;
use crate::error::AppError;

/// Archived staff are reported as missing; they never resurface.
pub(crate) async fn require_staff(directory: &dyn StaffDirectory, staff_id: &str) -> Result<Staff, AppError> {
    match directory.get_staff(staff_id).await? {
        Some(staff) if !staff.archived => Ok(staff),
        _ => Err(AppError::NotFound(format!("Staff {} not found", staff_id))),
    }
}

/// Like [`require_staff`] but also checks the staff member belongs to `business_id`.
pub(crate) async fn require_business_staff(
    directory: &dyn StaffDirectory,
    business_id: &str,
    staff_id: &str,
) -> Result<Staff, AppError> {
    let staff = require_staff(directory, staff_id).await?;
    if staff.business_id != business_id {
        return Err(AppError::NotFound(format!("Staff {} not found", staff_id)));
    }
    Ok(staff)
}
