use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{
    models::{AccountModel, Role},
    repository::AccountRepository,
    types::{AccountCreateRequest, AccountResponse, AccountUpdateRequest},
};
use crate::security::{password::hash_password, repository::RefreshTokenRepository, AccountClaims};
use crate::shared::{AppError, AppState};

/// Service for handling account business logic
pub struct AccountService {
    repository: Arc<dyn AccountRepository + Send + Sync>,
    refresh_tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
}

impl AccountService {
    pub fn new(
        repository: Arc<dyn AccountRepository + Send + Sync>,
        refresh_tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            refresh_tokens,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.account_repository),
            Arc::clone(&state.refresh_token_repository),
        )
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<AccountResponse>, AppError> {
        let accounts = self.repository.list().await?;
        info!(account_count = accounts.len(), "Accounts retrieved successfully");
        Ok(accounts.into_iter().map(AccountResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<AccountResponse, AppError> {
        self.find(id).await.map(AccountResponse::from)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: AccountCreateRequest) -> Result<AccountResponse, AppError> {
        request.validate()?;

        let account = AccountModel::new(
            request.name.trim().to_string(),
            hash_password(&request.password),
            request.role.unwrap_or_default(),
        );
        self.repository.create(&account).await?;

        info!(account_id = %account.id, role = %account.role, "Account created successfully");
        Ok(account.into())
    }

    /// Administrators may edit any account but not their own role;
    /// everyone else may only edit their own name and password
    #[instrument(skip(self, caller, request), fields(caller_id = %caller.sub))]
    pub async fn update(
        &self,
        caller: &AccountClaims,
        id: Uuid,
        request: AccountUpdateRequest,
    ) -> Result<AccountResponse, AppError> {
        let is_self = caller.account_id() == id;
        if !is_self {
            caller.require_role(&[Role::Administrator])?;
        }

        request.validate()?;
        let mut account = self.find(id).await?;

        if let Some(role) = request.role {
            if role != account.role && is_self {
                return Err(AppError::Forbidden(
                    "You may not change your own role.".to_string(),
                ));
            }
            account.role = role;
        }

        account.name = request.name.trim().to_string();

        let password_changed = match &request.password {
            Some(password) => {
                account.password_hash = hash_password(password);
                true
            }
            None => false,
        };

        account.touch();
        self.repository.update(&account).await?;

        if password_changed {
            let revoked = self.refresh_tokens.delete_for_account(account.id).await?;
            debug!(account_id = %account.id, revoked, "Password changed; refresh tokens revoked");
        }

        info!(account_id = %account.id, "Account updated successfully");
        Ok(account.into())
    }

    #[instrument(skip(self, caller), fields(caller_id = %caller.sub))]
    pub async fn delete(&self, caller: &AccountClaims, id: Uuid) -> Result<(), AppError> {
        caller.require_role(&[Role::Administrator])?;

        if caller.account_id() == id {
            return Err(AppError::Forbidden(
                "You may not delete your own account.".to_string(),
            ));
        }

        self.repository.delete(id).await?;
        self.refresh_tokens.delete_for_account(id).await?;

        info!(account_id = %id, "Account deleted successfully");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<AccountModel, AppError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account with ID '{}' not found.", id)))
    }
}
