use std::sync::Arc;
use crate::domain::ports::{
    AppointmentRepository, AvailabilityExceptionRepository, AvailabilityTemplateRepository,
    BusinessHoursRepository, CustomerDirectory, SlotRepository, StaffDirectory,
};
use crate::domain::services::{
    appointment_service::AppointmentService, exception_service::ExceptionService,
    schedule_service::ScheduleService, slot_allocator::SlotAllocator, slot_compiler::SlotCompiler,
};
use crate::config::Config;

/// Storage adapters for one backend.
#[derive(Clone)]
pub struct Repositories {
    pub staff_directory: Arc<dyn StaffDirectory>,
    pub customer_directory: Arc<dyn CustomerDirectory>,
    pub business_hours_repo: Arc<dyn BusinessHoursRepository>,
    pub template_repo: Arc<dyn AvailabilityTemplateRepository>,
    pub exception_repo: Arc<dyn AvailabilityExceptionRepository>,
    pub slot_repo: Arc<dyn SlotRepository>,
    pub appointment_repo: Arc<dyn AppointmentRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repos: Repositories,
    pub slot_compiler: Arc<SlotCompiler>,
    pub slot_allocator: Arc<SlotAllocator>,
    pub schedule_service: Arc<ScheduleService>,
    pub exception_service: Arc<ExceptionService>,
    pub appointment_service: Arc<AppointmentService>,
}

impl AppState {
    pub fn from_repositories(config: Config, repos: Repositories) -> Self {
        let slot_compiler = Arc::new(SlotCompiler::new(
            repos.staff_directory.clone(),
            repos.template_repo.clone(),
            repos.exception_repo.clone(),
            repos.slot_repo.clone(),
            config.timezone,
        ));
        let slot_allocator = Arc::new(SlotAllocator::new(repos.slot_repo.clone(), repos.staff_directory.clone()));
        let schedule_service = Arc::new(ScheduleService::new(
            repos.staff_directory.clone(),
            repos.business_hours_repo.clone(),
            repos.template_repo.clone(),
            slot_compiler.clone(),
            config.slot_horizon_days,
        ));
        let exception_service = Arc::new(ExceptionService::new(
            repos.staff_directory.clone(),
            repos.exception_repo.clone(),
            slot_compiler.clone(),
            config.slot_horizon_days,
        ));
        let appointment_service = Arc::new(AppointmentService::new(
            repos.staff_directory.clone(),
            repos.customer_directory.clone(),
            repos.appointment_repo.clone(),
        ));

        Self {
            config,
            repos,
            slot_compiler,
            slot_allocator,
            schedule_service,
            exception_service,
            appointment_service,
        }
    }
}
