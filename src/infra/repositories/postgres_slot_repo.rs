use crate::domain::{models::slot::TimeSlot, ports::SlotRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use chrono::{NaiveDate, NaiveTime};

pub struct PostgresSlotRepo {
    pool: PgPool,
}

impl PostgresSlotRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    async fn flag_retired(&self, sql: &str, slot_ids: &[String]) -> Result<u64, AppError> {
        if slot_ids.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut changed = 0;
        for slot_id in slot_ids {
            let result = sqlx::query(sql)
                .bind(slot_id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
            changed += result.rows_affected();
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(changed)
    }
}

/// Compare-and-set on `is_booked`: the row only comes back to the caller that flipped it.
pub(crate) async fn reserve_slot(
    conn: &mut PgConnection,
    staff_id: &str,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<Option<TimeSlot>, AppError> {
    sqlx::query_as::<_, TimeSlot>(
        "UPDATE time_slots SET is_booked = TRUE
         WHERE staff_id = $1 AND date = $2 AND time = $3 AND is_booked = FALSE AND is_blocked = FALSE
         RETURNING *"
    )
        .bind(staff_id)
        .bind(date)
        .bind(time)
        .fetch_optional(conn)
        .await
        .map_err(AppError::Database)
}

pub(crate) async fn release_slot(conn: &mut PgConnection, slot_id: &str) -> Result<Option<TimeSlot>, AppError> {
    sqlx::query_as::<_, TimeSlot>("UPDATE time_slots SET is_booked = FALSE WHERE id = $1 RETURNING *")
        .bind(slot_id)
        .fetch_optional(conn)
        .await
        .map_err(AppError::Database)
}

#[async_trait]
impl SlotRepository for PostgresSlotRepo {
    async fn insert_missing(&self, slots: &[TimeSlot]) -> Result<u64, AppError> {
        if slots.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut inserted = 0;
        for slot in slots {
            let result = sqlx::query(
                "INSERT INTO time_slots (id, staff_id, business_id, date, time, duration_minutes, is_booked, is_blocked, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                 ON CONFLICT(staff_id, date, time) DO NOTHING"
            )
                .bind(&slot.id).bind(&slot.staff_id).bind(&slot.business_id)
                .bind(slot.date).bind(slot.time).bind(slot.duration_minutes)
                .bind(slot.is_booked).bind(slot.is_blocked).bind(slot.created_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
            inserted += result.rows_affected();
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(inserted)
    }

    async fn find_by_id(&self, slot_id: &str) -> Result<Option<TimeSlot>, AppError> {
        sqlx::query_as::<_, TimeSlot>("SELECT * FROM time_slots WHERE id = $1")
            .bind(slot_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_key(&self, staff_id: &str, date: NaiveDate, time: NaiveTime) -> Result<Option<TimeSlot>, AppError> {
        sqlx::query_as::<_, TimeSlot>("SELECT * FROM time_slots WHERE staff_id = $1 AND date = $2 AND time = $3")
            .bind(staff_id).bind(date).bind(time)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_range(&self, staff_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<TimeSlot>, AppError> {
        sqlx::query_as::<_, TimeSlot>(
            "SELECT * FROM time_slots WHERE staff_id = $1 AND date >= $2 AND date <= $3 ORDER BY date, time"
        )
            .bind(staff_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_available(&self, staff_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<TimeSlot>, AppError> {
        sqlx::query_as::<_, TimeSlot>(
            "SELECT * FROM time_slots
             WHERE staff_id = $1 AND date >= $2 AND date <= $3 AND is_booked = FALSE AND is_blocked = FALSE
             ORDER BY date, time"
        )
            .bind(staff_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn reserve(&self, staff_id: &str, date: NaiveDate, time: NaiveTime) -> Result<Option<TimeSlot>, AppError> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        reserve_slot(&mut conn, staff_id, date, time).await
    }

    async fn release(&self, slot_id: &str) -> Result<Option<TimeSlot>, AppError> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        release_slot(&mut conn, slot_id).await
    }

    async fn set_blocked(&self, slot_id: &str, blocked: bool) -> Result<Option<TimeSlot>, AppError> {
        sqlx::query_as::<_, TimeSlot>("UPDATE time_slots SET is_blocked = $1 WHERE id = $2 AND is_booked = FALSE AND is_retired = FALSE RETURNING *")
            .bind(blocked)
            .bind(slot_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete_unused(&self, slot_ids: &[String]) -> Result<u64, AppError> {
        if slot_ids.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut removed = 0;
        for slot_id in slot_ids {
            let result = sqlx::query(
                "DELETE FROM time_slots
                 WHERE id = $1 AND is_booked = FALSE AND is_blocked = FALSE
                 AND NOT EXISTS (SELECT 1 FROM appointments WHERE appointments.slot_id = time_slots.id)"
            )
                .bind(slot_id)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
            removed += result.rows_affected();
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(removed)
    }

    async fn retire(&self, slot_ids: &[String]) -> Result<u64, AppError> {
        self.flag_retired(
            "UPDATE time_slots SET is_blocked = TRUE, is_retired = TRUE WHERE id = $1",
            slot_ids,
        ).await
    }

    async fn restore(&self, slot_ids: &[String]) -> Result<u64, AppError> {
        self.flag_retired(
            "UPDATE time_slots SET is_blocked = FALSE, is_retired = FALSE WHERE id = $1 AND is_retired = TRUE",
            slot_ids,
        ).await
    }
}
