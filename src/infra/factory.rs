use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::error::AppError;
use crate::state::{AppState, Repositories};
use crate::infra::repositories::{
    postgres_appointment_repo::PostgresAppointmentRepo, postgres_business_hours_repo::PostgresBusinessHoursRepo,
    postgres_exception_repo::PostgresExceptionRepo, postgres_slot_repo::PostgresSlotRepo,
    postgres_staff_directory::PostgresStaffDirectory, postgres_template_repo::PostgresTemplateRepo,
    sqlite_appointment_repo::SqliteAppointmentRepo, sqlite_business_hours_repo::SqliteBusinessHoursRepo,
    sqlite_exception_repo::SqliteExceptionRepo, sqlite_slot_repo::SqliteSlotRepo,
    sqlite_staff_directory::SqliteStaffDirectory, sqlite_template_repo::SqliteTemplateRepo,
};

pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    let database_url = &config.database_url;

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().map_err(AppError::Database)?;
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .map_err(AppError::Database)?;

        run_postgres_migrations(&pool).await?;
        postgres_repositories(pool)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .map_err(AppError::Database)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(AppError::Database)?;

        run_sqlite_migrations(&pool).await?;
        sqlite_repositories(pool)
    };

    Ok(AppState::from_repositories(config.clone(), repos))
}

pub fn sqlite_repositories(pool: SqlitePool) -> Repositories {
    let directory = Arc::new(SqliteStaffDirectory::new(pool.clone()));
    Repositories {
        staff_directory: directory.clone(),
        customer_directory: directory,
        business_hours_repo: Arc::new(SqliteBusinessHoursRepo::new(pool.clone())),
        template_repo: Arc::new(SqliteTemplateRepo::new(pool.clone())),
        exception_repo: Arc::new(SqliteExceptionRepo::new(pool.clone())),
        slot_repo: Arc::new(SqliteSlotRepo::new(pool.clone())),
        appointment_repo: Arc::new(SqliteAppointmentRepo::new(pool)),
    }
}

pub fn postgres_repositories(pool: PgPool) -> Repositories {
    let directory = Arc::new(PostgresStaffDirectory::new(pool.clone()));
    Repositories {
        staff_directory: directory.clone(),
        customer_directory: directory,
        business_hours_repo: Arc::new(PostgresBusinessHoursRepo::new(pool.clone())),
        template_repo: Arc::new(PostgresTemplateRepo::new(pool.clone())),
        exception_repo: Arc::new(PostgresExceptionRepo::new(pool.clone())),
        slot_repo: Arc::new(PostgresSlotRepo::new(pool.clone())),
        appointment_repo: Arc::new(PostgresAppointmentRepo::new(pool)),
    }
}

pub async fn run_postgres_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .map_err(|e| AppError::Database(e.into()))
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .map_err(|e| AppError::Database(e.into()))
}
