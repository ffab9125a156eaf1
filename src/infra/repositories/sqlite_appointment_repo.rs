use crate::domain::models::appointment::{
    Appointment, AppointmentHistoryEntry, AppointmentStatus, HistoryChangeType, NewAppointment, RescheduleTarget,
};
use crate::domain::ports::AppointmentRepository;
use crate::error::{is_unique_violation, AppError};
use crate::infra::repositories::sqlite_slot_repo::{release_slot, reserve_slot};
use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use chrono::{NaiveDate, Utc};

pub struct SqliteAppointmentRepo {
    pool: SqlitePool,
}

impl SqliteAppointmentRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

async fn insert_history(conn: &mut SqliteConnection, entry: &AppointmentHistoryEntry) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO appointment_history (id, appointment_id, changed_by, change_type, old_date, old_time, new_date, new_time, notes, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    )
        .bind(&entry.id).bind(&entry.appointment_id).bind(&entry.changed_by).bind(entry.change_type)
        .bind(entry.old_date).bind(entry.old_time).bind(entry.new_date).bind(entry.new_time)
        .bind(&entry.notes).bind(entry.created_at)
        .execute(conn).await.map_err(AppError::Database)?;
    Ok(())
}

fn slot_taken(e: sqlx::Error, slot_id: &str) -> AppError {
    if is_unique_violation(&e) {
        AppError::ConcurrencyConflict(format!("Slot {} already holds an appointment", slot_id))
    } else {
        AppError::Database(e)
    }
}

/// Explains why a guarded update on a scheduled appointment matched no row.
async fn ensure_applied(
    conn: &mut SqliteConnection,
    updated: Option<Appointment>,
    appointment: &Appointment,
) -> Result<Appointment, AppError> {
    if let Some(row) = updated {
        return Ok(row);
    }
    let current = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = ?")
        .bind(&appointment.id)
        .fetch_optional(conn)
        .await
        .map_err(AppError::Database)?;

    Err(match current {
        None => AppError::NotFound(format!("Appointment {} not found", appointment.id)),
        Some(current) if current.status == AppointmentStatus::Cancelled => {
            AppError::InvalidTransition(format!("Appointment {} is already cancelled", current.id))
        }
        Some(current) if current.status.is_terminal() => AppError::InvalidTransition(format!(
            "Appointment {} is {} and can no longer change", current.id, current.status.as_str()
        )),
        Some(current) => AppError::InvalidTransition(format!(
            "Appointment {} was rescheduled while this change was in flight", current.id
        )),
    })
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepo {
    async fn book(&self, draft: &NewAppointment) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let slot = reserve_slot(&mut tx, &draft.staff_id, draft.date, draft.time).await?
            .ok_or_else(|| AppError::SlotUnavailable(format!(
                "Slot {} {} is not available for staff {}", draft.date, draft.time.format("%H:%M"), draft.staff_id
            )))?;
        slot.ensure_fits(draft.duration_minutes)?;

        let appointment = Appointment::from_reservation(draft, &slot);
        let created = sqlx::query_as::<_, Appointment>(
            "INSERT INTO appointments (id, business_id, customer_id, staff_id, service_id, slot_id, date, time, duration_minutes, status, created_via, cancellation_reason, sync_status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&appointment.id).bind(&appointment.business_id).bind(&appointment.customer_id).bind(&appointment.staff_id)
            .bind(&appointment.service_id).bind(&appointment.slot_id).bind(appointment.date).bind(appointment.time)
            .bind(appointment.duration_minutes).bind(appointment.status).bind(&appointment.created_via)
            .bind(&appointment.cancellation_reason).bind(appointment.sync_status)
            .bind(appointment.created_at).bind(appointment.updated_at)
            .fetch_one(&mut *tx).await.map_err(|e| slot_taken(e, &slot.id))?;

        insert_history(&mut tx, &AppointmentHistoryEntry::created(&created, &draft.changed_by)).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, business_id: &str, id: &str) -> Result<Option<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE business_id = ? AND id = ?")
            .bind(business_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_staff(&self, staff_id: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE staff_id = ? AND date >= ? AND date <= ? ORDER BY date, time"
        )
            .bind(staff_id).bind(start).bind(end)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn cancel(&self, appointment: &Appointment, reason: Option<String>, changed_by: &str) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let cancelled = sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET status = 'cancelled', cancellation_reason = ?, sync_status = 'pending', updated_at = ?
             WHERE id = ? AND status = 'scheduled'
             RETURNING *"
        )
            .bind(&reason).bind(Utc::now()).bind(&appointment.id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;
        let cancelled = ensure_applied(&mut tx, cancelled, appointment).await?;

        release_slot(&mut tx, &cancelled.slot_id).await?;
        insert_history(&mut tx, &AppointmentHistoryEntry::cancelled(&cancelled, changed_by, reason)).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(cancelled)
    }

    async fn reschedule(&self, appointment: &Appointment, target: &RescheduleTarget, changed_by: &str) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let slot = reserve_slot(&mut tx, &target.staff_id, target.date, target.time).await?
            .ok_or_else(|| AppError::SlotUnavailable(format!(
                "Slot {} {} is not available for staff {}", target.date, target.time.format("%H:%M"), target.staff_id
            )))?;
        slot.ensure_fits(appointment.duration_minutes)?;

        let updated = sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET staff_id = ?, slot_id = ?, date = ?, time = ?, sync_status = 'pending', updated_at = ?
             WHERE id = ? AND status = 'scheduled' AND slot_id = ?
             RETURNING *"
        )
            .bind(&slot.staff_id).bind(&slot.id).bind(slot.date).bind(slot.time).bind(Utc::now())
            .bind(&appointment.id).bind(&appointment.slot_id)
            .fetch_optional(&mut *tx).await.map_err(|e| slot_taken(e, &slot.id))?;
        let updated = ensure_applied(&mut tx, updated, appointment).await?;

        release_slot(&mut tx, &appointment.slot_id).await?;
        insert_history(&mut tx, &AppointmentHistoryEntry::rescheduled(appointment, &updated, changed_by)).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn close(&self, appointment: &Appointment, status: AppointmentStatus, changed_by: &str, notes: Option<String>) -> Result<Appointment, AppError> {
        let change_type = match status {
            AppointmentStatus::Completed => HistoryChangeType::Completed,
            AppointmentStatus::NoShow => HistoryChangeType::NoShow,
            other => return Err(AppError::InvalidTransition(format!("Cannot close appointment as {}", other.as_str()))),
        };
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let closed = sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET status = ?, sync_status = 'pending', updated_at = ?
             WHERE id = ? AND status = 'scheduled'
             RETURNING *"
        )
            .bind(status).bind(Utc::now()).bind(&appointment.id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;
        let closed = ensure_applied(&mut tx, closed, appointment).await?;

        insert_history(&mut tx, &AppointmentHistoryEntry::closed(&closed, change_type, changed_by, notes)).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(closed)
    }

    async fn list_history(&self, appointment_id: &str) -> Result<Vec<AppointmentHistoryEntry>, AppError> {
        sqlx::query_as::<_, AppointmentHistoryEntry>(
            "SELECT * FROM appointment_history WHERE appointment_id = ? ORDER BY created_at, rowid"
        )
            .bind(appointment_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
