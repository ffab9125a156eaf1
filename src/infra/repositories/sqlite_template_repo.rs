use crate::domain::{models::availability::AvailabilityTemplate, ports::AvailabilityTemplateRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteTemplateRepo {
    pool: SqlitePool,
}

impl SqliteTemplateRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl AvailabilityTemplateRepository for SqliteTemplateRepo {
    async fn list_active(&self, staff_id: &str) -> Result<Vec<AvailabilityTemplate>, AppError> {
        sqlx::query_as::<_, AvailabilityTemplate>(
            "SELECT * FROM availability_templates WHERE staff_id = ? AND active = 1 ORDER BY day_of_week, start_time"
        )
            .bind(staff_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn replace_active(&self, staff_id: &str, templates: &[AvailabilityTemplate]) -> Result<Vec<AvailabilityTemplate>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("UPDATE availability_templates SET active = 0 WHERE staff_id = ?")
            .bind(staff_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let mut saved = Vec::with_capacity(templates.len());
        for template in templates {
            let row = sqlx::query_as::<_, AvailabilityTemplate>(
                r#"INSERT INTO availability_templates (id, staff_id, day_of_week, start_time, end_time, slot_duration_minutes, active, created_at)
                   VALUES (?, ?, ?, ?, ?, ?, 1, ?)
                   ON CONFLICT(staff_id, day_of_week, start_time, end_time) DO UPDATE SET
                   slot_duration_minutes=excluded.slot_duration_minutes,
                   active=1
                   RETURNING *"#
            )
                .bind(&template.id).bind(staff_id).bind(template.day_of_week)
                .bind(template.start_time).bind(template.end_time)
                .bind(template.slot_duration_minutes).bind(template.created_at)
                .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
            saved.push(row);
        }
        tx.commit().await.map_err(AppError::Database)?;

        saved.sort_by_key(|t| (t.day_of_week, t.start_time));
        Ok(saved)
    }
}
