use std::env;
use chrono_tz::Tz;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Days of bookable slots kept materialized ahead of today.
    pub slot_horizon_days: u32,
    pub slot_refresh_interval_secs: u64,
    /// Defines which calendar date counts as "today".
    pub timezone: Tz,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            slot_horizon_days: env::var("SLOT_HORIZON_DAYS").unwrap_or_else(|_| "30".to_string()).parse().expect("SLOT_HORIZON_DAYS must be a number"),
            slot_refresh_interval_secs: env::var("SLOT_REFRESH_INTERVAL_SECS").unwrap_or_else(|_| "3600".to_string()).parse().expect("SLOT_REFRESH_INTERVAL_SECS must be a number"),
            timezone: env::var("SCHEDULING_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()).parse().expect("SCHEDULING_TIMEZONE must be an IANA timezone name"),
        }
    }
}
