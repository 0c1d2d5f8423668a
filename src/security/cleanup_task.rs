use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, instrument};

use super::repository::RefreshTokenRepository;

/// Configuration for the refresh token cleanup task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often expired tokens are purged
    pub cleanup_interval: Duration,
}

impl CleanupConfig {
    pub fn from_minutes(minutes: u64) -> Self {
        Self {
            cleanup_interval: Duration::from_secs(minutes.max(1).saturating_mul(60)),
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self::from_minutes(60)
    }
}

/// Periodically removes expired refresh tokens. Runs until the task is aborted.
#[instrument(skip(refresh_tokens))]
pub async fn start_cleanup_task(
    refresh_tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
    config: CleanupConfig,
) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        "Starting refresh token cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);

    loop {
        cleanup_interval.tick().await;

        match refresh_tokens.cleanup_expired().await {
            Ok(removed) => info!(removed, "Refresh token cleanup completed"),
            Err(e) => error!(error = %e, "Refresh token cleanup failed"),
        }
    }
}
