use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Opening hours of a business for one day of the week (0=Sunday..6=Saturday).
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BusinessHours {
    pub id: String,
    pub business_id: String,
    pub day_of_week: i32,
    pub is_open: bool,
    pub open_time: Option<NaiveTime>,
    pub close_time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
}

impl BusinessHours {
    pub fn new(
        business_id: String,
        day_of_week: i32,
        is_open: bool,
        open_time: Option<NaiveTime>,
        close_time: Option<NaiveTime>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            business_id,
            day_of_week,
            is_open,
            open_time,
            close_time,
            created_at: Utc::now(),
        }
    }
}
