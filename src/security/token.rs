use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};

use super::models::RefreshTokenModel;
use super::types::{AccountClaims, RefreshClaims};
use crate::accounts::models::AccountModel;
use crate::settings::Settings;
use crate::shared::AppError;

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_minutes: i64,
}

impl TokenConfig {
    pub fn new(secret: String, access_token_minutes: i64, refresh_token_minutes: i64) -> Self {
        Self {
            secret,
            access_token_minutes,
            refresh_token_minutes,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.jwt_secret.clone(),
            settings.access_token_minutes,
            settings.refresh_token_minutes,
        )
    }

    /// Creates an access token for the account, returning it with its lifetime in seconds
    #[instrument(skip(self, account), fields(account_id = %account.id))]
    pub fn create_access_token(&self, account: &AccountModel) -> Result<(String, i64), AppError> {
        let now = Utc::now();
        let lifetime = Duration::minutes(self.access_token_minutes);
        let exp = (now + lifetime).timestamp() as usize;

        debug!(
            access_token_minutes = self.access_token_minutes,
            exp_timestamp = exp,
            "Creating access token"
        );

        let claims = AccountClaims {
            sub: account.id,
            name: account.name.clone(),
            role: account.role,
            exp,
            iat: now.timestamp() as usize,
        };

        let token = self.encode(&claims)?;
        Ok((token, lifetime.num_seconds()))
    }

    /// Creates the JWT form of a stored refresh token
    #[instrument(skip(self, refresh_token), fields(token_id = %refresh_token.id))]
    pub fn create_refresh_token(&self, refresh_token: &RefreshTokenModel) -> Result<String, AppError> {
        let claims = RefreshClaims {
            sub: refresh_token.account_id,
            jti: refresh_token.id,
            exp: refresh_token.expires.timestamp() as usize,
            iat: refresh_token.issued.timestamp() as usize,
        };

        self.encode(&claims)
    }

    #[instrument(skip(self, token))]
    pub fn validate_access_token(&self, token: &str) -> Result<AccountClaims, AppError> {
        debug!("Decoding and validating access token");
        let claims: AccountClaims = self.decode(token)?;
        debug!(account_id = %claims.sub, role = %claims.role, "Access token decoded successfully");
        Ok(claims)
    }

    #[instrument(skip(self, token))]
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, AppError> {
        debug!("Decoding and validating refresh token");
        self.decode(token)
    }

    fn encode<T: serde::Serialize>(&self, claims: &T) -> Result<String, AppError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::JwtError(e.to_string())
        })
    }

    fn decode<T: serde::de::DeserializeOwned>(&self, token: &str) -> Result<T, AppError> {
        decode::<T>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::JwtError(e.to_string())
        })
    }
}
