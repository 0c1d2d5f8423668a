use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    models::RefreshTokenModel,
    password::{hash_password, verify_password},
    repository::RefreshTokenRepository,
    token::TokenConfig,
    types::{AccountClaims, TokenResponse},
};
use crate::accounts::{
    models::{AccountModel, Role},
    repository::AccountRepository,
};
use crate::shared::{AppError, AppState};

const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// Service for login, token refresh and token revocation
pub struct SecurityService {
    accounts: Arc<dyn AccountRepository + Send + Sync>,
    refresh_tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl SecurityService {
    pub fn new(
        accounts: Arc<dyn AccountRepository + Send + Sync>,
        refresh_tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            accounts,
            refresh_tokens,
            token_config,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.account_repository),
            Arc::clone(&state.refresh_token_repository),
            state.token_config.clone(),
        )
    }

    /// Verifies credentials and issues a new access/refresh token pair
    #[instrument(skip(self, password))]
    pub async fn login(&self, name: &str, password: &str) -> Result<TokenResponse, AppError> {
        info!(name = %name, "Attempting login");

        let account = match self.accounts.get_by_name(name).await? {
            Some(account) if verify_password(password, &account.password_hash) => account,
            _ => {
                warn!(name = %name, "Login rejected");
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        let tokens = self.issue_tokens(&account).await?;
        info!(account_id = %account.id, role = %account.role, "Login successful");
        Ok(tokens)
    }

    /// Exchanges a refresh token for a new pair. The presented token is consumed.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        let claims = self
            .token_config
            .validate_refresh_token(refresh_token)
            .map_err(|e| {
                warn!(error = %e, "Refresh token failed validation");
                AppError::Unauthorized("The refresh token is invalid.".to_string())
            })?;

        let stored = self.refresh_tokens.get(claims.jti).await?.ok_or_else(|| {
            warn!(token_id = %claims.jti, "Refresh token not found - may have been revoked");
            AppError::Unauthorized("The refresh token has been revoked.".to_string())
        })?;

        // Single use: only the caller that actually removes the token may redeem it
        if !self.refresh_tokens.delete(stored.id).await? {
            warn!(token_id = %stored.id, "Refresh token already redeemed");
            return Err(AppError::Unauthorized(
                "The refresh token has been revoked.".to_string(),
            ));
        }

        if stored.is_expired() || stored.account_id != claims.sub {
            warn!(token_id = %stored.id, "Refresh token expired or mismatched");
            return Err(AppError::Unauthorized(
                "The refresh token has expired.".to_string(),
            ));
        }

        let account = self.accounts.get(stored.account_id).await?.ok_or_else(|| {
            warn!(account_id = %stored.account_id, "Refresh token belongs to a deleted account");
            AppError::Unauthorized("The account no longer exists.".to_string())
        })?;

        let tokens = self.issue_tokens(&account).await?;
        info!(account_id = %account.id, "Refresh token rotated");
        Ok(tokens)
    }

    /// Revokes every refresh token held by the account
    #[instrument(skip(self))]
    pub async fn logout(&self, account_id: Uuid) -> Result<u64, AppError> {
        let revoked = self.refresh_tokens.delete_for_account(account_id).await?;
        info!(account_id = %account_id, revoked, "Refresh tokens revoked");
        Ok(revoked)
    }

    /// Validates an access token and reloads the account so role changes and
    /// deletions take effect immediately
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> Result<AccountClaims, AppError> {
        let mut claims = self.token_config.validate_access_token(token)?;

        let account = self.accounts.get(claims.sub).await?.ok_or_else(|| {
            warn!(account_id = %claims.sub, "Token presented for a deleted account");
            AppError::Unauthorized("Account not found or has been deleted".to_string())
        })?;

        claims.name = account.name;
        claims.role = account.role;
        Ok(claims)
    }

    /// Creates the `admin` account when no accounts exist yet
    #[instrument(skip(self, password))]
    pub async fn ensure_administrator(&self, password: &str) -> Result<bool, AppError> {
        if self.accounts.count().await? > 0 {
            return Ok(false);
        }

        let admin = AccountModel::new(
            "admin".to_string(),
            hash_password(password),
            Role::Administrator,
        );
        self.accounts.create(&admin).await?;
        info!(account_id = %admin.id, "Seeded administrator account");
        Ok(true)
    }

    async fn issue_tokens(&self, account: &AccountModel) -> Result<TokenResponse, AppError> {
        let (access_token, expires_in) = self.token_config.create_access_token(account)?;

        let stored = RefreshTokenModel::new(account.id, self.token_config.refresh_token_minutes);
        self.refresh_tokens.create(&stored).await?;
        let refresh_token = self.token_config.create_refresh_token(&stored)?;

        Ok(TokenResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        })
    }
}
