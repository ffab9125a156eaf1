use crate::domain::{models::exception::AvailabilityException, ports::AvailabilityExceptionRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use chrono::NaiveDate;

const UPSERT_SQL: &str = r#"INSERT INTO availability_exceptions (id, staff_id, exception_date, exception_type, start_time, end_time, reason, created_at)
   VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
   ON CONFLICT(staff_id, exception_date) DO UPDATE SET
   exception_type=excluded.exception_type,
   start_time=excluded.start_time,
   end_time=excluded.end_time,
   reason=excluded.reason
   RETURNING *"#;

pub struct PostgresExceptionRepo {
    pool: PgPool,
}

impl PostgresExceptionRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

async fn upsert_on(conn: &mut PgConnection, entity: &AvailabilityException) -> Result<AvailabilityException, AppError> {
    sqlx::query_as::<_, AvailabilityException>(UPSERT_SQL)
        .bind(&entity.id)
        .bind(&entity.staff_id)
        .bind(entity.exception_date)
        .bind(entity.exception_type)
        .bind(entity.start_time)
        .bind(entity.end_time)
        .bind(&entity.reason)
        .bind(entity.created_at)
        .fetch_one(conn)
        .await
        .map_err(AppError::Database)
}

#[async_trait]
impl AvailabilityExceptionRepository for PostgresExceptionRepo {
    async fn upsert(&self, exception: &AvailabilityException) -> Result<AvailabilityException, AppError> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        upsert_on(&mut conn, exception).await
    }

    async fn upsert_many(&self, exceptions: &[AvailabilityException]) -> Result<Vec<AvailabilityException>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut saved = Vec::with_capacity(exceptions.len());
        for exception in exceptions {
            saved.push(upsert_on(&mut tx, exception).await?);
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(saved)
    }

    async fn list_by_range(&self, staff_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<AvailabilityException>, AppError> {
        sqlx::query_as::<_, AvailabilityException>(
            "SELECT * FROM availability_exceptions WHERE staff_id = $1 AND exception_date >= $2 AND exception_date <= $3 ORDER BY exception_date"
        )
            .bind(staff_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_from(&self, staff_id: &str, start: NaiveDate) -> Result<Vec<AvailabilityException>, AppError> {
        sqlx::query_as::<_, AvailabilityException>(
            "SELECT * FROM availability_exceptions WHERE staff_id = $1 AND exception_date >= $2 ORDER BY exception_date"
        )
            .bind(staff_id)
            .bind(start)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete(&self, staff_id: &str, date: NaiveDate) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM availability_exceptions WHERE staff_id = $1 AND exception_date = $2")
            .bind(staff_id).bind(date)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound(format!("No exception on {}", date))); }
        Ok(())
    }

    async fn delete_range(&self, staff_id: &str, start: NaiveDate, end: NaiveDate) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM availability_exceptions WHERE staff_id = $1 AND exception_date >= $2 AND exception_date <= $3")
            .bind(staff_id).bind(start).bind(end)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
