//! # API Key Repository
//!
//! Keys accepted in the `X-API-KEY` header. Keys are deactivated, never
//! deleted, so the lowest id is always the oldest key ever issued.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use pos_core::ApiKey;

const SELECT_KEY: &str = "SELECT id, api_key, active, created_at FROM api_keys";

#[derive(Debug, Clone)]
pub struct ApiKeyRepository {
    pool: SqlitePool,
}

impl ApiKeyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ApiKeyRepository { pool }
    }

    /// Oldest key, active or not.
    pub async fn first_by_id(&self) -> DbResult<Option<ApiKey>> {
        let key = sqlx::query_as::<_, ApiKey>(&format!("{SELECT_KEY} ORDER BY id LIMIT 1"))
            .fetch_optional(&self.pool)
            .await?;
        Ok(key)
    }

    /// Oldest active key.
    pub async fn first_active(&self) -> DbResult<Option<ApiKey>> {
        let key = sqlx::query_as::<_, ApiKey>(&format!(
            "{SELECT_KEY} WHERE active = 1 ORDER BY id LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(key)
    }

    /// The active key equal to `api_key`, if any.
    pub async fn find_active_by_key(&self, api_key: &str) -> DbResult<Option<ApiKey>> {
        let key = sqlx::query_as::<_, ApiKey>(&format!(
            "{SELECT_KEY} WHERE api_key = ?1 AND active = 1 ORDER BY id LIMIT 1"
        ))
        .bind(api_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(key)
    }

    /// Stores a new active key.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - key already stored
    pub async fn insert(&self, api_key: &str) -> DbResult<ApiKey> {
        let created_at = Utc::now();

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO api_keys (api_key, active, created_at) VALUES (?1, 1, ?2) RETURNING id",
        )
        .bind(api_key)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;

        info!(id, "API key stored");
        Ok(ApiKey {
            id,
            api_key: api_key.to_string(),
            active: true,
            created_at,
        })
    }

    pub async fn deactivate(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deactivating API key");

        let result = sqlx::query("UPDATE api_keys SET active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ApiKey", id.to_string()));
        }
        Ok(())
    }
}
