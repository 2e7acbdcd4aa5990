//! Policy error types.

use thiserror::Error;
use uuid::Uuid;

use atrium_shared::AppError;

/// Errors that can occur during policy operations.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A stored rule payload could not be interpreted.
    #[error("Policy rule {rule_id} has a malformed payload: {detail}")]
    MalformedPayload {
        /// The offending rule.
        rule_id: Uuid,
        /// What was wrong with the payload.
        detail: String,
    },

    /// A required lookup field was missing or empty.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Policy rule not found.
    #[error("Policy rule {0} not found")]
    RuleNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl PolicyError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MalformedPayload { .. } => 422,
            Self::Validation(_) => 400,
            Self::RuleNotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedPayload { .. } => "MALFORMED_POLICY_PAYLOAD",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::RuleNotFound(_) => "POLICY_RULE_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<PolicyError> for AppError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::MalformedPayload { .. } => Self::DataIntegrity(err.to_string()),
            PolicyError::Validation(msg) => Self::Validation(msg),
            PolicyError::RuleNotFound(_) => Self::NotFound(err.to_string()),
            PolicyError::Database(msg) => Self::Database(msg),
        }
    }
}
