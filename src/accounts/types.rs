use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{AccountModel, Role};
use crate::shared::AppError;
use crate::validation::Validator;

/// Request payload for creating an account
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCreateRequest {
    #[serde(default)]
    pub name: String,
    pub role: Option<Role>,
    #[serde(default)]
    pub password: String,
}

impl AccountCreateRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut validator = Validator::new();
        validator
            .required("name", "Name", &self.name)
            .required("password", "Password", &self.password);
        validator.finish()
    }
}

/// Request payload for updating an account. Omitted role/password are left unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdateRequest {
    #[serde(default)]
    pub name: String,
    pub role: Option<Role>,
    pub password: Option<String>,
}

impl AccountUpdateRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut validator = Validator::new();
        validator.required("name", "Name", &self.name);
        if let Some(password) = &self.password {
            validator.required("password", "Password", password);
        }
        validator.finish()
    }
}

/// Account as returned by the API; the password hash never leaves the server
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub creation_date: DateTime<Utc>,
    pub last_update_date: DateTime<Utc>,
}

impl From<AccountModel> for AccountResponse {
    fn from(value: AccountModel) -> Self {
        let AccountModel {
            id,
            name,
            role,
            creation_date,
            last_update_date,
            ..
        } = value;
        Self {
            id,
            name,
            role,
            creation_date,
            last_update_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() {
        let request: AccountCreateRequest = serde_json::from_str(r#"{"name": "nick"}"#).unwrap();
        assert_eq!(request.role, None);

        match request.validate() {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors["password"], "The Password field is required.");
                assert!(!errors.contains_key("name"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_update_request_blank_password() {
        let request: AccountUpdateRequest =
            serde_json::from_str(r#"{"name": "nick", "password": ""}"#).unwrap();
        assert!(matches!(request.validate(), Err(AppError::Validation(_))));

        let request: AccountUpdateRequest = serde_json::from_str(r#"{"name": "nick"}"#).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_response_omits_password_hash() {
        let account = AccountModel::new("jp".to_string(), "secret-hash".to_string(), Role::Administrator);
        let json = serde_json::to_string(&AccountResponse::from(account)).unwrap();

        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"role\":\"Administrator\""));
        assert!(json.contains("creationDate"));
    }
}
