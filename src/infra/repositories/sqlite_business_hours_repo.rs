use crate::domain::{models::business_hours::BusinessHours, ports::BusinessHoursRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteBusinessHoursRepo {
    pool: SqlitePool,
}

impl SqliteBusinessHoursRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl BusinessHoursRepository for SqliteBusinessHoursRepo {
    async fn list_for_business(&self, business_id: &str) -> Result<Vec<BusinessHours>, AppError> {
        sqlx::query_as::<_, BusinessHours>("SELECT * FROM business_hours WHERE business_id = ? ORDER BY day_of_week")
            .bind(business_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn replace(&self, business_id: &str, hours: &[BusinessHours]) -> Result<Vec<BusinessHours>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM business_hours WHERE business_id = ?")
            .bind(business_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let mut saved = Vec::with_capacity(hours.len());
        for row in hours {
            let inserted = sqlx::query_as::<_, BusinessHours>(
                "INSERT INTO business_hours (id, business_id, day_of_week, is_open, open_time, close_time, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)
                 RETURNING *"
            )
                .bind(&row.id).bind(business_id).bind(row.day_of_week).bind(row.is_open)
                .bind(row.open_time).bind(row.close_time).bind(row.created_at)
                .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
            saved.push(inserted);
        }
        tx.commit().await.map_err(AppError::Database)?;

        saved.sort_by_key(|h| h.day_of_week);
        Ok(saved)
    }
}
