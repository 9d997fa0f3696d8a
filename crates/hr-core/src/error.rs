//! Core error types for hrdash

use std::collections::BTreeMap;
use thiserror::Error;

/// Core error type for all hrdash operations
#[derive(Error, Debug)]
pub enum HrError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type HrResult<T> = Result<T, HrError>;

impl HrError {
    pub fn not_found(entity: &'static str, value: impl ToString) -> Self {
        HrError::NotFound {
            entity,
            field: "id",
            value: value.to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        HrError::Forbidden {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        HrError::Conflict {
            message: message.into(),
        }
    }

    /// HTTP status code mapping
    pub fn status_code(&self) -> u16 {
        match self {
            HrError::NotFound { .. } => 404,
            HrError::Unauthorized { .. } => 401,
            HrError::Forbidden { .. } => 403,
            HrError::Validation(_) => 422,
            HrError::Conflict { .. } => 409,
            HrError::Database(_) | HrError::Internal(_) | HrError::Configuration(_) => 500,
        }
    }

    pub fn error_identifier(&self) -> &'static str {
        match self {
            HrError::NotFound { .. } => "hrdash:NotFound",
            HrError::Unauthorized { .. } => "hrdash:Unauthenticated",
            HrError::Forbidden { .. } => "hrdash:MissingPermission",
            HrError::Validation(_) => "hrdash:PropertyConstraintViolation",
            HrError::Conflict { .. } => "hrdash:Conflict",
            HrError::Database(_) | HrError::Internal(_) | HrError::Configuration(_) => {
                "hrdash:InternalError"
            }
        }
    }
}

/// Validation errors collection, keyed by field.
///
/// A `BTreeMap` keeps `full_messages` in a stable order.
#[derive(Error, Debug, Default, Clone, PartialEq)]
#[error("{}", self.full_messages().join(", "))]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> messages
    pub errors: BTreeMap<String, Vec<String>>,
    /// Errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}
