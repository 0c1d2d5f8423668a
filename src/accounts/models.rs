use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

/// Access tier of an account
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum Role {
    Administrator,
    Supervisor,
    #[default]
    User,
}

impl Role {
    /// Roles allowed to modify patrons, events, services and scans
    pub const EDITORS: &'static [Role] = &[Role::Administrator, Role::Supervisor];
}

/// Database model for accounts table
#[derive(Debug, Clone)]
pub struct AccountModel {
    pub id: Uuid,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub creation_date: DateTime<Utc>,
    pub last_update_date: DateTime<Utc>,
}

impl AccountModel {
    /// Creates a new account with a generated ID and current timestamps
    pub fn new(name: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            name,
            password_hash,
            role,
            creation_date: now,
            last_update_date: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_update_date = Utc::now();
    }
}
