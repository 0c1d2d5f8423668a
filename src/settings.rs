use serde_json::Value;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// Default settings file, resolved against the working directory
pub const APP_SETTINGS_FILE: &str = "appsettings.json";

const DEVELOPMENT_JWT_SECRET: &str = "qcvoc-development-secret-change-in-production";

#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("The setting '{0}' could not be found, and no default value was given. Check the configuration.")]
    Missing(String),

    #[error("The setting '{name}' has an invalid value '{value}'")]
    Invalid { name: String, value: String },
}

/// Looks settings up in environment variables first, then in appsettings.json
pub struct SettingsSource {
    app_settings: Value,
}

impl SettingsSource {
    /// Reads the settings file at `path`. A missing or malformed file is treated as empty.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let app_settings = match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring malformed settings file");
                Value::Null
            }),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Settings file not read");
                Value::Null
            }
        };

        Self { app_settings }
    }

    pub fn from_json(app_settings: Value) -> Self {
        Self { app_settings }
    }

    /// Returns the raw value of `name`, or None when neither source has a non-empty value.
    /// Colon-separated names walk nested objects in the settings file.
    pub fn lookup(&self, name: &str) -> Option<String> {
        if let Ok(value) = std::env::var(name) {
            if !value.is_empty() {
                return Some(value);
            }
        }

        let mut node = &self.app_settings;
        for segment in name.split(':') {
            node = node.get(segment)?;
        }

        let value = match node {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };

        (!value.is_empty()).then_some(value)
    }

    /// Required setting, parsed into `T`
    pub fn get_setting<T: FromStr>(&self, name: &str) -> Result<T, SettingsError> {
        self.get_optional(name)?
            .ok_or_else(|| SettingsError::Missing(name.to_string()))
    }

    /// Setting parsed into `T`, falling back to `default` when absent
    pub fn get_setting_or<T: FromStr>(&self, name: &str, default: T) -> Result<T, SettingsError> {
        Ok(self.get_optional(name)?.unwrap_or(default))
    }

    fn get_optional<T: FromStr>(&self, name: &str) -> Result<Option<T>, SettingsError> {
        match self.lookup(name) {
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| SettingsError::Invalid {
                    name: name.to_string(),
                    value: raw,
                }),
            None => Ok(None),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub connection_string: Option<String>,
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_minutes: i64,
    pub bind_address: String,
    pub admin_password: Option<String>,
    pub token_cleanup_minutes: u64,
}

impl Settings {
    pub fn load() -> Result<Self, SettingsError> {
        Self::from_source(&SettingsSource::from_file(APP_SETTINGS_FILE))
    }

    pub fn from_source(source: &SettingsSource) -> Result<Self, SettingsError> {
        let jwt_secret = match source.lookup("qcvoc_jwt_secret") {
            Some(secret) => secret,
            None => {
                warn!("qcvoc_jwt_secret is not set; using the development secret");
                DEVELOPMENT_JWT_SECRET.to_string()
            }
        };

        Ok(Self {
            connection_string: source.lookup("qcvoc_connectionstring"),
            jwt_secret,
            access_token_minutes: source.get_setting_or("qcvoc_access_token_minutes", 15)?,
            refresh_token_minutes: source.get_setting_or("qcvoc_refresh_token_minutes", 10080)?,
            bind_address: source.get_setting_or(
                "qcvoc_bind_address",
                "0.0.0.0:5000".to_string(),
            )?,
            admin_password: source.lookup("qcvoc_admin_password"),
            token_cleanup_minutes: source.get_setting_or("qcvoc_token_cleanup_minutes", 60)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_reads_app_settings() {
        let source = SettingsSource::from_json(json!({
            "qcvoc_test_plain": "value",
            "Jwt": { "Lifetime": 30 }
        }));

        assert_eq!(source.lookup("qcvoc_test_plain"), Some("value".to_string()));
        assert_eq!(source.lookup("Jwt:Lifetime"), Some("30".to_string()));
        assert_eq!(source.lookup("Jwt:Missing"), None);
    }

    #[test]
    fn test_environment_takes_precedence() {
        std::env::set_var("QCVOC_TEST_PRECEDENCE", "from-env");
        let source = SettingsSource::from_json(json!({ "QCVOC_TEST_PRECEDENCE": "from-file" }));

        assert_eq!(
            source.lookup("QCVOC_TEST_PRECEDENCE"),
            Some("from-env".to_string())
        );
        std::env::remove_var("QCVOC_TEST_PRECEDENCE");
    }

    #[test]
    fn test_empty_environment_value_falls_through() {
        std::env::set_var("QCVOC_TEST_EMPTY", "");
        let source = SettingsSource::from_json(json!({ "QCVOC_TEST_EMPTY": "from-file" }));

        assert_eq!(
            source.lookup("QCVOC_TEST_EMPTY"),
            Some("from-file".to_string())
        );
        std::env::remove_var("QCVOC_TEST_EMPTY");
    }

    #[test]
    fn test_typed_settings() {
        let source = SettingsSource::from_json(json!({
            "minutes": "45",
            "bad": "forty-five"
        }));

        assert_eq!(source.get_setting::<i64>("minutes"), Ok(45));
        assert_eq!(source.get_setting_or::<i64>("absent", 7), Ok(7));
        assert_eq!(
            source.get_setting::<i64>("absent"),
            Err(SettingsError::Missing("absent".to_string()))
        );
        assert!(matches!(
            source.get_setting::<i64>("bad"),
            Err(SettingsError::Invalid { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let source = SettingsSource::from_file("/nonexistent/appsettings.json");
        assert_eq!(source.lookup("anything_at_all"), None);
    }

    #[test]
    fn test_settings_defaults() {
        let source = SettingsSource::from_json(json!({
            "qcvoc_jwt_secret": "file-secret",
            "qcvoc_access_token_minutes": 5
        }));
        let settings = Settings::from_source(&source).unwrap();

        assert_eq!(settings.jwt_secret, "file-secret");
        assert_eq!(settings.access_token_minutes, 5);
        assert_eq!(settings.refresh_token_minutes, 10080);
        assert_eq!(settings.token_cleanup_minutes, 60);
    }
}
