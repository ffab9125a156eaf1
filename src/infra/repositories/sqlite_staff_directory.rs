use crate::domain::{models::staff::Staff, ports::{CustomerDirectory, StaffDirectory}};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Read access to the staff and customer tables maintained by their owning collaborators.
pub struct SqliteStaffDirectory {
    pool: SqlitePool,
}

impl SqliteStaffDirectory {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl StaffDirectory for SqliteStaffDirectory {
    async fn get_staff(&self, staff_id: &str) -> Result<Option<Staff>, AppError> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE id = ?")
            .bind(staff_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_schedulable(&self) -> Result<Vec<Staff>, AppError> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE active = 1 AND archived = 0 ORDER BY business_id, id")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}

#[async_trait]
impl CustomerDirectory for SqliteStaffDirectory {
    async fn customer_exists(&self, customer_id: &str, business_id: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE id = ? AND business_id = ?")
            .bind(customer_id)
            .bind(business_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(count > 0)
    }
}
