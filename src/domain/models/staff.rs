use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Read-only view of a staff member, owned by the staff-management collaborator.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Staff {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub active: bool,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Staff {
    /// Archived is terminal; inactive staff may come back.
    pub fn is_schedulable(&self) -> bool {
        self.active && !self.archived
    }
}
