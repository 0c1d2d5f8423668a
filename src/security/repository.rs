use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::RefreshTokenModel;
use crate::shared::{map_sqlx_error, AppError};

/// Trait for refresh token repository operations
#[async_trait]
pub trait RefreshTokenRepository {
    async fn create(&self, token: &RefreshTokenModel) -> Result<(), AppError>;
    async fn get(&self, id: Uuid) -> Result<Option<RefreshTokenModel>, AppError>;
    /// Returns whether a token was removed
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
    async fn delete_for_account(&self, account_id: Uuid) -> Result<u64, AppError>;
    async fn cleanup_expired(&self) -> Result<u64, AppError>;
}

/// In-memory implementation of RefreshTokenRepository for development and testing
pub struct InMemoryRefreshTokenRepository {
    tokens: RwLock<HashMap<Uuid, RefreshTokenModel>>,
}

impl Default for InMemoryRefreshTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    #[instrument(skip(self, token))]
    async fn create(&self, token: &RefreshTokenModel) -> Result<(), AppError> {
        debug!(token_id = %token.id, account_id = %token.account_id, "Storing refresh token in memory");

        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.id) {
            return Err(AppError::Conflict("Refresh token already exists".to_string()));
        }
        tokens.insert(token.id, token.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<RefreshTokenModel>, AppError> {
        Ok(self.tokens.read().await.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.tokens.write().await.remove(&id).is_some())
    }

    #[instrument(skip(self))]
    async fn delete_for_account(&self, account_id: Uuid) -> Result<u64, AppError> {
        let mut tokens = self.tokens.write().await;
        let initial_count = tokens.len();
        tokens.retain(|_, token| token.account_id != account_id);
        Ok((initial_count - tokens.len()) as u64)
    }

    #[instrument(skip(self))]
    async fn cleanup_expired(&self) -> Result<u64, AppError> {
        let mut tokens = self.tokens.write().await;
        let now = Utc::now();
        let initial_count = tokens.len();

        tokens.retain(|_, token| token.expires > now);

        let removed_count = initial_count - tokens.len();
        debug!(
            expired_tokens_removed = removed_count,
            "Expired refresh tokens cleaned up from memory"
        );
        Ok(removed_count as u64)
    }
}

/// PostgreSQL implementation of refresh token repository
pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    #[instrument(skip(self, token))]
    async fn create(&self, token: &RefreshTokenModel) -> Result<(), AppError> {
        debug!(token_id = %token.id, account_id = %token.account_id, "Storing refresh token in database");

        sqlx::query(
            "INSERT INTO refresh_tokens (id, account_id, issued, expires) VALUES ($1, $2, $3, $4)",
        )
        .bind(token.id)
        .bind(token.account_id)
        .bind(token.issued)
        .bind(token.expires)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to store refresh token in database");
            map_sqlx_error(e)
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<RefreshTokenModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, account_id, issued, expires FROM refresh_tokens WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, token_id = %id, "Failed to fetch refresh token from database");
            map_sqlx_error(e)
        })?;

        Ok(row.map(|row| RefreshTokenModel {
            id: row.get("id"),
            account_id: row.get("account_id"),
            issued: row.get("issued"),
            expires: row.get("expires"),
        }))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_for_account(&self, account_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE account_id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, account_id = %account_id, "Failed to revoke refresh tokens");
                map_sqlx_error(e)
            })?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn cleanup_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires < $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to cleanup expired refresh tokens");
                map_sqlx_error(e)
            })?;

        let rows_affected = result.rows_affected();
        debug!(
            expired_tokens_removed = rows_affected,
            "Expired refresh tokens cleaned up"
        );
        Ok(rows_affected)
    }
}
