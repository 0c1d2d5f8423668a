use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::PatronModel;
use crate::shared::AppError;
use crate::validation::Validator;

/// Request payload for creating or replacing a patron
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatronRequest {
    pub member_id: Option<i32>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub primary_phone: String,
    pub secondary_phone: Option<String>,
    pub email: Option<String>,
    pub enrollment_date: Option<DateTime<Utc>>,
}

impl PatronRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut validator = Validator::new();
        validator
            .present("memberId", "Member Id", &self.member_id)
            .required("firstName", "First Name", &self.first_name)
            .required("lastName", "Last Name", &self.last_name)
            .required("address", "Address", &self.address)
            .required("primaryPhone", "Primary Phone", &self.primary_phone);

        if let Some(email) = self.email.as_deref().map(str::trim) {
            validator.check(
                email.is_empty() || email.contains('@'),
                "email",
                "The Email field is not a valid e-mail address.",
            );
        }

        validator.finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatronResponse {
    pub id: Uuid,
    pub member_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub primary_phone: String,
    pub secondary_phone: Option<String>,
    pub email: Option<String>,
    pub enrollment_date: DateTime<Utc>,
    pub creation_date: DateTime<Utc>,
    pub creation_by: Uuid,
    pub last_update_date: DateTime<Utc>,
    pub last_update_by: Uuid,
}

impl From<PatronModel> for PatronResponse {
    fn from(value: PatronModel) -> Self {
        let PatronModel {
            id,
            member_id,
            first_name,
            last_name,
            address,
            primary_phone,
            secondary_phone,
            email,
            enrollment_date,
            creation_date,
            creation_by,
            last_update_date,
            last_update_by,
        } = value;
        Self {
            id,
            member_id,
            first_name,
            last_name,
            address,
            primary_phone,
            secondary_phone,
            email,
            enrollment_date,
            creation_date,
            creation_by,
            last_update_date,
            last_update_by,
        }
    }
}
