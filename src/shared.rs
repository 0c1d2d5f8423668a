use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::accounts::repository::{
    AccountRepository, InMemoryAccountRepository, PostgresAccountRepository,
};
use crate::events::repository::{
    EventRepository, InMemoryEventRepository, PostgresEventRepository,
};
use crate::patrons::repository::{
    InMemoryPatronRepository, PatronRepository, PostgresPatronRepository,
};
use crate::scans::repository::{InMemoryScanRepository, PostgresScanRepository, ScanRepository};
use crate::security::repository::{
    InMemoryRefreshTokenRepository, PostgresRefreshTokenRepository, RefreshTokenRepository,
};
use crate::security::TokenConfig;
use crate::services::repository::{
    InMemoryServiceRepository, PostgresServiceRepository, ServiceRepository,
};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub account_repository: Arc<dyn AccountRepository + Send + Sync>,
    pub refresh_token_repository: Arc<dyn RefreshTokenRepository + Send + Sync>,
    pub patron_repository: Arc<dyn PatronRepository + Send + Sync>,
    pub event_repository: Arc<dyn EventRepository + Send + Sync>,
    pub service_repository: Arc<dyn ServiceRepository + Send + Sync>,
    pub scan_repository: Arc<dyn ScanRepository + Send + Sync>,
    pub token_config: TokenConfig,
}

impl AppState {
    /// State backed by PostgreSQL repositories sharing one pool
    pub fn postgres(pool: PgPool, token_config: TokenConfig) -> Self {
        Self {
            account_repository: Arc::new(PostgresAccountRepository::new(pool.clone())),
            refresh_token_repository: Arc::new(PostgresRefreshTokenRepository::new(pool.clone())),
            patron_repository: Arc::new(PostgresPatronRepository::new(pool.clone())),
            event_repository: Arc::new(PostgresEventRepository::new(pool.clone())),
            service_repository: Arc::new(PostgresServiceRepository::new(pool.clone())),
            scan_repository: Arc::new(PostgresScanRepository::new(pool)),
            token_config,
        }
    }

    /// State backed by in-memory repositories, for development and tests.
    /// Data is lost when the process exits.
    pub fn in_memory(token_config: TokenConfig) -> Self {
        Self {
            account_repository: Arc::new(InMemoryAccountRepository::new()),
            refresh_token_repository: Arc::new(InMemoryRefreshTokenRepository::new()),
            patron_repository: Arc::new(InMemoryPatronRepository::new()),
            event_repository: Arc::new(InMemoryEventRepository::new()),
            service_repository: Arc::new(InMemoryServiceRepository::new()),
            scan_repository: Arc::new(InMemoryScanRepository::new()),
            token_config,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation failed: {0:?}")]
    Validation(BTreeMap<String, String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Convenience for a validation failure on a single field
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), message.into());
        AppError::Validation(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Field errors are returned as-is, keyed by field name
            AppError::Validation(errors) => {
                return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
            }
            AppError::JwtError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {}", msg),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal => {
                error!("Internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Maps a sqlx error to an AppError, treating unique violations as conflicts
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db_error) = e.as_database_error() {
        if db_error.code().as_deref() == Some("23505") {
            return AppError::Conflict(db_error.message().to_string());
        }
    }
    AppError::DatabaseError(e.to_string())
}
