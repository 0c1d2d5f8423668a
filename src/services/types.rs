use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::ServiceModel;
use crate::shared::AppError;
use crate::validation::Validator;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub limit: Option<i32>,
}

impl ServiceRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut validator = Validator::new();
        validator.required("name", "Name", &self.name).check(
            self.limit.map_or(true, |limit| limit > 0),
            "limit",
            "The Limit must be a positive number.",
        );
        validator.finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub limit: Option<i32>,
    pub creation_date: DateTime<Utc>,
    pub creation_by: Uuid,
    pub last_update_date: DateTime<Utc>,
    pub last_update_by: Uuid,
}

impl From<ServiceModel> for ServiceResponse {
    fn from(value: ServiceModel) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            limit: value.limit,
            creation_date: value.creation_date,
            creation_by: value.creation_by,
            last_update_date: value.last_update_date,
            last_update_by: value.last_update_by,
        }
    }
}
