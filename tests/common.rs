use scheduling_backend::{
    api::router::create_router,
    config::Config,
    domain::models::availability::AvailabilityTemplate,
    infra::factory::sqlite_repositories,
    state::AppState,
};
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde_json::Value;
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const BUSINESS_ID: &str = "biz-1";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            slot_horizon_days: 30,
            slot_refresh_interval_secs: 3600,
            timezone: chrono_tz::UTC,
        };

        let state = Arc::new(AppState::from_repositories(config, sqlite_repositories(pool.clone())));
        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn seed_staff(&self, business_id: &str) -> String {
        self.seed_staff_with(business_id, true, false).await
    }

    pub async fn seed_staff_with(&self, business_id: &str, active: bool, archived: bool) -> String {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO staff (id, business_id, name, active, archived, created_at) VALUES (?, ?, ?, ?, ?, ?)")
            .bind(&id)
            .bind(business_id)
            .bind("Test Staff")
            .bind(active)
            .bind(archived)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .unwrap();
        id
    }

    pub async fn set_staff_active(&self, staff_id: &str, active: bool) {
        sqlx::query("UPDATE staff SET active = ? WHERE id = ?")
            .bind(active)
            .bind(staff_id)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn seed_customer(&self, business_id: &str) -> String {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO customers (id, business_id, name, created_at) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(business_id)
            .bind("Test Customer")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .unwrap();
        id
    }

    /// Monday to Friday 09:00-17:00, closed at the weekend.
    pub async fn seed_business_hours(&self, business_id: &str) {
        for day in 0..7 {
            let is_open = (1..=5).contains(&day);
            let (open, close) = if is_open { (Some(hm(9, 0)), Some(hm(17, 0))) } else { (None, None) };
            sqlx::query(
                "INSERT INTO business_hours (id, business_id, day_of_week, is_open, open_time, close_time, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)"
            )
                .bind(Uuid::new_v4().to_string())
                .bind(business_id)
                .bind(day)
                .bind(is_open)
                .bind(open)
                .bind(close)
                .bind(Utc::now())
                .execute(&self.pool)
                .await
                .unwrap();
        }
    }

    pub async fn seed_template(&self, staff_id: &str, day_of_week: i32, start: NaiveTime, end: NaiveTime, minutes: i32) {
        let template = AvailabilityTemplate::new(staff_id.to_string(), day_of_week, start, end, minutes);
        sqlx::query(
            "INSERT INTO availability_templates (id, staff_id, day_of_week, start_time, end_time, slot_duration_minutes, active, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
            .bind(&template.id)
            .bind(&template.staff_id)
            .bind(template.day_of_week)
            .bind(template.start_time)
            .bind(template.end_time)
            .bind(template.slot_duration_minutes)
            .bind(template.active)
            .bind(template.created_at)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn count_slots(&self, staff_id: &str, date: NaiveDate) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM time_slots WHERE staff_id = ? AND date = ?")
            .bind(staff_id)
            .bind(date)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (axum::http::StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        let body = match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

#[allow(dead_code)]
pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// First `weekday` strictly after `after`.
#[allow(dead_code)]
pub fn next_weekday(after: NaiveDate, weekday: Weekday) -> NaiveDate {
    let mut date = after + Duration::days(1);
    while date.weekday() != weekday {
        date += Duration::days(1);
    }
    date
}

#[allow(dead_code)]
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
