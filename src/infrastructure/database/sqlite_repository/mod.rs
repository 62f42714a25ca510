use super::ConnectionPool;
use super::Repository;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

mod listings;
mod queries;
mod view_records;

pub struct SqliteRepository {
    pool: ConnectionPool,
}

impl SqliteRepository {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn initialize(&self) -> Result<(), AppError> {
        self.pool.migrate().await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        let result = sqlx::query("SELECT 1")
            .fetch_one(self.pool.get_pool())
            .await;
        Ok(result.is_ok())
    }
}

pub(super) fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>, AppError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| AppError::DeserializationError(format!("Invalid timestamp: {millis}")))
}

#[cfg(test)]
pub(super) async fn setup_repository() -> SqliteRepository {
    let pool = ConnectionPool::from_memory()
        .await
        .expect("failed to create pool");
    let repo = SqliteRepository::new(pool);
    repo.initialize().await.expect("failed to migrate");
    repo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_check_after_initialize() {
        let repo = setup_repository().await;
        assert!(repo.health_check().await.unwrap());
    }
}
