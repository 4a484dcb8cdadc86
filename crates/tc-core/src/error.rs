//! Core error types for TaskCenter RS
//!
//! Every operation in the core rejects bad input at its boundary with one of
//! these variants; infrastructure failures propagate as `Database`/`Internal`.

use std::collections::HashMap;
use thiserror::Error;

/// Core error type for all TaskCenter operations
#[derive(Error, Debug)]
pub enum TcError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// Caller lacks the authority for the operation. Never downgraded to a
    /// no-op; the message names the missing authority.
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    /// The target entity is in a state that blocks the operation
    /// (e.g. evaluating a task that is not completed).
    #[error("Invalid state: {message}")]
    State { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TcError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }
}

/// Validation errors collection, keyed by attribute
#[derive(Error, Debug, Default, Clone)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: HashMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-field error shorthand
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
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

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Get errors for a specific field
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
}

/// HTTP status code mapping for errors
impl TcError {
    pub fn status_code(&self) -> u16 {
        match self {
            TcError::NotFound { .. } => 404,
            TcError::PermissionDenied { .. } => 403,
            TcError::State { .. } => 409,
            TcError::Validation(_) => 422,
            TcError::Database(_) | TcError::Internal(_) => 500,
            TcError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            TcError::NotFound { .. } => "not_found",
            TcError::PermissionDenied { .. } => "permission_denied",
            TcError::State { .. } => "invalid_state",
            TcError::Validation(_) => "validation_failed",
            TcError::Database(_) => "database_error",
            TcError::Internal(_) => "internal_error",
            TcError::Config(_) => "configuration_error",
        }
    }
}
