use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Database model for refresh_tokens table
#[derive(Debug, Clone)]
pub struct RefreshTokenModel {
    pub id: Uuid, // Also the `jti` of the issued JWT
    pub account_id: Uuid,
    pub issued: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl RefreshTokenModel {
    pub fn new(account_id: Uuid, lifetime_minutes: i64) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            account_id,
            issued: now,
            expires: now + chrono::Duration::minutes(lifetime_minutes),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires
    }
}
