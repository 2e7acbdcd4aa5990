//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// The variants map onto the four error classes the core distinguishes:
/// validation (rejected before any write), state conflict (caller may
/// retry with fresh state), transient delivery (retried by the
/// dispatcher), and data integrity (surfaced, never defaulted).
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error - nothing was persisted.
    #[error("Validation error: {0}")]
    Validation(String),

    /// State conflict (e.g. duplicate active instance, terminal task).
    #[error("State conflict: {0}")]
    StateConflict(String),

    /// Stored data could not be interpreted.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// Transient delivery failure (retried with backoff).
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::StateConflict(_) => 409,
            Self::DataIntegrity(_) => 422,
            Self::Delivery(_) | Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::StateConflict(_) => "STATE_CONFLICT",
            Self::DataIntegrity(_) => "DATA_INTEGRITY_ERROR",
            Self::Delivery(_) => "DELIVERY_FAILED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(AppError::NotFound(String::new()), 404)]
    #[case(AppError::Validation(String::new()), 400)]
    #[case(AppError::StateConflict(String::new()), 409)]
    #[case(AppError::DataIntegrity(String::new()), 422)]
    #[case(AppError::Delivery(String::new()), 500)]
    #[case(AppError::Database(String::new()), 500)]
    #[case(AppError::Internal(String::new()), 500)]
    fn test_error_status_codes(#[case] error: AppError, #[case] status: u16) {
        assert_eq!(error.status_code(), status);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            AppError::StateConflict(String::new()).error_code(),
            "STATE_CONFLICT"
        );
        assert_eq!(
            AppError::DataIntegrity(String::new()).error_code(),
            "DATA_INTEGRITY_ERROR"
        );
        assert_eq!(
            AppError::Delivery(String::new()).error_code(),
            "DELIVERY_FAILED"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::StateConflict("msg".into()).to_string(),
            "State conflict: msg"
        );
        assert_eq!(
            AppError::DataIntegrity("msg".into()).to_string(),
            "Data integrity error: msg"
        );
        assert_eq!(
            AppError::Database("msg".into()).to_string(),
            "Database error: msg"
        );
    }
}
