pub mod appointment;
pub mod availability;
pub mod business_hours;
pub mod exception;
pub mod slot;
pub mod staff;
