use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::{AccountModel, Role};
use crate::shared::{map_sqlx_error, AppError};

/// Trait for account repository operations
#[async_trait]
pub trait AccountRepository {
    async fn create(&self, account: &AccountModel) -> Result<(), AppError>;
    async fn get(&self, id: Uuid) -> Result<Option<AccountModel>, AppError>;
    /// Case-insensitive lookup by name
    async fn get_by_name(&self, name: &str) -> Result<Option<AccountModel>, AppError>;
    async fn list(&self) -> Result<Vec<AccountModel>, AppError>;
    async fn update(&self, account: &AccountModel) -> Result<(), AppError>;
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
    async fn count(&self) -> Result<i64, AppError>;
}

/// In-memory implementation of AccountRepository for development and testing
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<Uuid, AccountModel>>,
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }

    fn name_taken(accounts: &HashMap<Uuid, AccountModel>, account: &AccountModel) -> bool {
        accounts
            .values()
            .any(|a| a.id != account.id && a.name.to_lowercase() == account.name.to_lowercase())
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    #[instrument(skip(self, account))]
    async fn create(&self, account: &AccountModel) -> Result<(), AppError> {
        debug!(account_id = %account.id, name = %account.name, "Creating account in memory");

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account.id) || Self::name_taken(&accounts, account) {
            warn!(name = %account.name, "Account already exists in memory");
            return Err(AppError::Conflict(format!(
                "An account named '{}' already exists.",
                account.name
            )));
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<AccountModel>, AppError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn get_by_name(&self, name: &str) -> Result<Option<AccountModel>, AppError> {
        let name = name.to_lowercase();
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.name.to_lowercase() == name)
            .cloned())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<AccountModel>, AppError> {
        let mut accounts: Vec<AccountModel> =
            self.accounts.read().await.values().cloned().collect();
        accounts.sort_by_key(|a| a.name.to_lowercase());
        Ok(accounts)
    }

    #[instrument(skip(self, account))]
    async fn update(&self, account: &AccountModel) -> Result<(), AppError> {
        debug!(account_id = %account.id, "Updating account in memory");

        let mut accounts = self.accounts.write().await;
        if !accounts.contains_key(&account.id) {
            return Err(AppError::NotFound("Account not found".to_string()));
        }
        if Self::name_taken(&accounts, account) {
            return Err(AppError::Conflict(format!(
                "An account named '{}' already exists.",
                account.name
            )));
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if self.accounts.write().await.remove(&id).is_none() {
            warn!(account_id = %id, "Account not found for deletion in memory");
            return Err(AppError::NotFound("Account not found".to_string()));
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.accounts.read().await.len() as i64)
    }
}

/// PostgreSQL implementation of account repository
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ACCOUNT_COLUMNS: &str = "id, name, password_hash, role, creation_date, last_update_date";

fn account_from_row(row: &PgRow) -> Result<AccountModel, AppError> {
    let role: String = row.get("role");
    let role = Role::from_str(&role).map_err(|_| {
        warn!(role = %role, "Unknown role stored in database");
        AppError::DatabaseError(format!("Unknown role '{}'", role))
    })?;

    Ok(AccountModel {
        id: row.get("id"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        role,
        creation_date: row.get("creation_date"),
        last_update_date: row.get("last_update_date"),
    })
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    #[instrument(skip(self, account))]
    async fn create(&self, account: &AccountModel) -> Result<(), AppError> {
        debug!(account_id = %account.id, name = %account.name, "Creating account in database");

        sqlx::query(
            "INSERT INTO accounts (id, name, password_hash, role, creation_date, last_update_date) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.password_hash)
        .bind(account.role.as_ref())
        .bind(account.creation_date)
        .bind(account.last_update_date)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create account in database");
            map_sqlx_error(e)
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<AccountModel>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, account_id = %id, "Failed to fetch account from database");
                map_sqlx_error(e)
            })?;

        row.as_ref().map(account_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn get_by_name(&self, name: &str) -> Result<Option<AccountModel>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE LOWER(name) = LOWER($1)",
            ACCOUNT_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch account by name from database");
            map_sqlx_error(e)
        })?;

        row.as_ref().map(account_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<AccountModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM accounts ORDER BY LOWER(name)",
            ACCOUNT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list accounts from database");
            map_sqlx_error(e)
        })?;

        rows.iter().map(account_from_row).collect()
    }

    #[instrument(skip(self, account))]
    async fn update(&self, account: &AccountModel) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE accounts SET name = $2, password_hash = $3, role = $4, last_update_date = $5 WHERE id = $1",
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.password_hash)
        .bind(account.role.as_ref())
        .bind(account.last_update_date)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, account_id = %account.id, "Failed to update account in database");
            map_sqlx_error(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Account not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, account_id = %id, "Failed to delete account from database");
                map_sqlx_error(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Account not found".to_string()));
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.get("total"))
    }
}
