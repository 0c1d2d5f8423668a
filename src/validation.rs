use std::collections::BTreeMap;

use crate::shared::AppError;

/// Accumulates field-level validation messages, keeping the first message per field
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records "The <label> field is required." when `value` is blank
    pub fn required(&mut self, field: &str, label: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.add(field, format!("The {} field is required.", label));
        }
        self
    }

    /// Records "The <label> field is required." when `value` is None
    pub fn present<T>(&mut self, field: &str, label: &str, value: &Option<T>) -> &mut Self {
        if value.is_none() {
            self.add(field, format!("The {} field is required.", label));
        }
        self
    }

    /// Records `message` unless `condition` holds
    pub fn check(&mut self, condition: bool, field: &str, message: impl Into<String>) -> &mut Self {
        if !condition {
            self.add(field, message.into());
        }
        self
    }

    fn add(&mut self, field: &str, message: String) {
        self.errors.entry(field.to_string()).or_insert(message);
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}
