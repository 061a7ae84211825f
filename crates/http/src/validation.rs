//! Field-addressable validation errors.
//!
//! Request bodies are checked field by field and every failure is collected
//! before anything is rejected, so a caller sees all problems at once.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;

/// Pseudo-field for rules that span several fields.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    fn to_value(&self) -> Value {
        serde_json::json!({
            "field": self.field,
            "code": self.code,
            "message": self.message,
        })
    }
}

/// Accumulator for field errors.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.errors.push(FieldError::new(field, code, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Look up `field` in `body`.
    ///
    /// When `required` is set, an absent key records `required`; an explicit
    /// `null` always records `null`. Either way `None` is returned.
    pub fn lookup<'a>(
        &mut self,
        body: &'a Map<String, Value>,
        field: &str,
        required: bool,
    ) -> Option<&'a Value> {
        match body.get(field) {
            Some(Value::Null) => {
                self.push(field, "null", "This field may not be null.");
                None
            }
            Some(value) => Some(value),
            None => {
                if required {
                    self.push(field, "required", "This field is required.");
                }
                None
            }
        }
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors
    /// as a validation error.
    pub fn finish<T>(self, value: T) -> Result<T, AppError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self.into())
        }
    }
}

impl From<FieldError> for FieldErrors {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        let details = errors.errors.iter().map(FieldError::to_value).collect();
        AppError::validation(details, "Invalid input.")
    }
}
