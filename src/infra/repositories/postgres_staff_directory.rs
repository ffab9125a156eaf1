use crate::domain::{models::staff::Staff, ports::{CustomerDirectory, StaffDirectory}};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

/// Read access to the staff and customer tables maintained by their owning collaborators.
pub struct PostgresStaffDirectory {
    pool: PgPool,
}

impl PostgresStaffDirectory {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl StaffDirectory for PostgresStaffDirectory {
    async fn get_staff(&self, staff_id: &str) -> Result<Option<Staff>, AppError> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE id = $1")
            .bind(staff_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_schedulable(&self) -> Result<Vec<Staff>, AppError> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE active = TRUE AND archived = FALSE ORDER BY business_id, id")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}

#[async_trait]
impl CustomerDirectory for PostgresStaffDirectory {
    async fn customer_exists(&self, customer_id: &str, business_id: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE id = $1 AND business_id = $2")
            .bind(customer_id)
            .bind(business_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(count > 0)
    }
}
