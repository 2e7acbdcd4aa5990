//! Outbox error types.

use thiserror::Error;
use uuid::Uuid;

use atrium_shared::AppError;

use crate::outbox::types::EventStatus;

/// Errors that can occur during outbox operations.
#[derive(Debug, Error)]
pub enum OutboxError {
    /// Event not found.
    #[error("Outbox event {0} not found")]
    EventNotFound(Uuid),

    /// Operation not valid for the event's current status.
    #[error("Outbox event {id} is {status}, operation not permitted")]
    StateConflict {
        /// The event id.
        id: Uuid,
        /// The event's current status.
        status: EventStatus,
    },

    /// A required event field was missing or empty.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Delivery to the sink failed (transient, retried with backoff).
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl OutboxError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::EventNotFound(_) => 404,
            Self::StateConflict { .. } => 409,
            Self::Validation(_) => 400,
            Self::Delivery(_) | Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EventNotFound(_) => "OUTBOX_EVENT_NOT_FOUND",
            Self::StateConflict { .. } => "STATE_CONFLICT",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Delivery(_) => "DELIVERY_FAILED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<OutboxError> for AppError {
    fn from(err: OutboxError) -> Self {
        match err {
            OutboxError::EventNotFound(_) => Self::NotFound(err.to_string()),
            OutboxError::StateConflict { .. } => Self::StateConflict(err.to_string()),
            OutboxError::Validation(msg) => Self::Validation(msg),
            OutboxError::Delivery(msg) => Self::Delivery(msg),
            OutboxError::Database(msg) => Self::Database(msg),
        }
    }
}
