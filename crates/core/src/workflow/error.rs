//! Workflow error types.

use thiserror::Error;
use uuid::Uuid;

use atrium_shared::AppError;

use crate::workflow::types::{InstanceStatus, TaskStatus};

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Attempted an invalid instance status transition.
    #[error("Invalid instance transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: InstanceStatus,
        /// The attempted target status.
        to: InstanceStatus,
    },

    /// Attempted to mutate an instance that is not running.
    #[error("Workflow instance is {0}, not running")]
    InstanceNotRunning(InstanceStatus),

    /// An active instance already exists for the entity and definition.
    #[error(
        "An active workflow instance already exists for {entity_type} {entity_id} under definition {definition_id}"
    )]
    DuplicateActiveInstance {
        /// Entity type of the conflicting instance.
        entity_type: String,
        /// Entity id of the conflicting instance.
        entity_id: Uuid,
        /// The workflow definition.
        definition_id: Uuid,
    },

    /// Attempted to complete a task that already reached a decision.
    #[error("Workflow task is already {0}")]
    TaskAlreadyTerminal(TaskStatus),

    /// Task name is required but not provided.
    #[error("Task name is required")]
    TaskNameRequired,

    /// Unknown decision value.
    #[error("Unknown task decision: {0}")]
    UnknownDecision(String),

    /// Workflow definition not found.
    #[error("Workflow definition {0} not found")]
    DefinitionNotFound(Uuid),

    /// Workflow instance not found.
    #[error("Workflow instance {0} not found")]
    InstanceNotFound(Uuid),

    /// Workflow task not found.
    #[error("Workflow task {0} not found")]
    TaskNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::TaskNameRequired | Self::UnknownDecision(_) => 400,
            Self::InvalidTransition { .. }
            | Self::InstanceNotRunning(_)
            | Self::DuplicateActiveInstance { .. }
            | Self::TaskAlreadyTerminal(_) => 409,
            Self::DefinitionNotFound(_) | Self::InstanceNotFound(_) | Self::TaskNotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::InstanceNotRunning(_) => "INSTANCE_NOT_RUNNING",
            Self::DuplicateActiveInstance { .. } => "DUPLICATE_ACTIVE_INSTANCE",
            Self::TaskAlreadyTerminal(_) => "TASK_ALREADY_TERMINAL",
            Self::TaskNameRequired => "TASK_NAME_REQUIRED",
            Self::UnknownDecision(_) => "UNKNOWN_DECISION",
            Self::DefinitionNotFound(_) => "WORKFLOW_DEFINITION_NOT_FOUND",
            Self::InstanceNotFound(_) => "WORKFLOW_INSTANCE_NOT_FOUND",
            Self::TaskNotFound(_) => "WORKFLOW_TASK_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match &err {
            WorkflowError::TaskNameRequired | WorkflowError::UnknownDecision(_) => {
                Self::Validation(err.to_string())
            }
            WorkflowError::InvalidTransition { .. }
            | WorkflowError::InstanceNotRunning(_)
            | WorkflowError::DuplicateActiveInstance { .. }
            | WorkflowError::TaskAlreadyTerminal(_) => Self::StateConflict(err.to_string()),
            WorkflowError::DefinitionNotFound(_)
            | WorkflowError::InstanceNotFound(_)
            | WorkflowError::TaskNotFound(_) => Self::NotFound(err.to_string()),
            WorkflowError::Database(msg) => Self::Database(msg.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_error() {
        let err = WorkflowError::InvalidTransition {
            from: InstanceStatus::Completed,
            to: InstanceStatus::Cancelled,
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert!(err.to_string().contains("completed"));
    }

    #[test]
    fn test_task_already_terminal_error() {
        let err = WorkflowError::TaskAlreadyTerminal(TaskStatus::Completed);
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "TASK_ALREADY_TERMINAL");
    }

    #[test]
    fn test_duplicate_active_instance_error() {
        let err = WorkflowError::DuplicateActiveInstance {
            entity_type: "Invoice".to_string(),
            entity_id: Uuid::nil(),
            definition_id: Uuid::nil(),
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "DUPLICATE_ACTIVE_INSTANCE");
    }

    #[test]
    fn test_not_found_errors() {
        assert_eq!(WorkflowError::InstanceNotFound(Uuid::nil()).status_code(), 404);
        assert_eq!(WorkflowError::TaskNotFound(Uuid::nil()).status_code(), 404);
        assert_eq!(
            WorkflowError::DefinitionNotFound(Uuid::nil()).status_code(),
            404
        );
    }

    #[test]
    fn test_app_error_mapping() {
        let err: AppError = WorkflowError::TaskAlreadyTerminal(TaskStatus::Rejected).into();
        assert_eq!(err.error_code(), "STATE_CONFLICT");

        let err: AppError = WorkflowError::TaskNameRequired.into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
