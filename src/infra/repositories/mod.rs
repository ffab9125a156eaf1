pub mod sqlite_staff_directory;
pub mod sqlite_business_hours_repo;
pub mod sqlite_template_repo;
pub mod sqlite_exception_repo;
pub mod sqlite_slot_repo;
pub mod sqlite_appointment_repo;

pub mod postgres_staff_directory;
pub mod postgres_business_hours_repo;
pub mod postgres_template_repo;
pub mod postgres_exception_repo;
pub mod postgres_slot_repo;
pub mod postgres_appointment_repo;
