//! Workflow state transition and instance-close logic.
//!
//! This module implements the state machine for workflow instances and
//! tasks. The close cascade after a task completion is modeled as a
//! total pure function of (definition policy, decision, open tasks) so
//! the persistence layer can apply it deterministically after every
//! task mutation.

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{
    CloseOutcome, DefinitionPolicy, InstanceStatus, TaskDecision, TaskStatus,
};

/// Stateless service for workflow state transitions.
pub struct WorkflowEngine;

impl WorkflowEngine {
    /// Check if an instance status transition is valid.
    ///
    /// Valid transitions:
    /// - Running → Completed
    /// - Running → Cancelled
    /// - Running → Errored
    #[must_use]
    pub fn is_valid_transition(from: InstanceStatus, to: InstanceStatus) -> bool {
        matches!(
            (from, to),
            (
                InstanceStatus::Running,
                InstanceStatus::Completed | InstanceStatus::Cancelled | InstanceStatus::Errored
            )
        )
    }

    /// Validate that an instance accepts mutations (new tasks, task
    /// completions).
    ///
    /// # Errors
    /// * `WorkflowError::InstanceNotRunning` if the instance is terminal
    pub const fn require_running(status: InstanceStatus) -> Result<(), WorkflowError> {
        match status {
            InstanceStatus::Running => Ok(()),
            other => Err(WorkflowError::InstanceNotRunning(other)),
        }
    }

    /// Compute the terminal task status for a completion.
    ///
    /// # Errors
    /// * `WorkflowError::TaskAlreadyTerminal` if the task already
    ///   reached a decision - completing twice is rejected, never
    ///   silently ignored
    pub const fn complete_task(
        current: TaskStatus,
        decision: TaskDecision,
    ) -> Result<TaskStatus, WorkflowError> {
        match current {
            TaskStatus::Pending | TaskStatus::InProgress => Ok(decision.resulting_status()),
            terminal => Err(WorkflowError::TaskAlreadyTerminal(terminal)),
        }
    }

    /// Validate an explicit operator cancellation.
    ///
    /// # Errors
    /// * `WorkflowError::InvalidTransition` unless the instance is
    ///   `Running`
    pub const fn cancel(current: InstanceStatus) -> Result<InstanceStatus, WorkflowError> {
        match current {
            InstanceStatus::Running => Ok(InstanceStatus::Cancelled),
            other => Err(WorkflowError::InvalidTransition {
                from: other,
                to: InstanceStatus::Cancelled,
            }),
        }
    }

    /// Evaluate the instance after a task completion.
    ///
    /// `open_tasks` is the number of Pending/InProgress tasks remaining
    /// *after* the completed task's new status is applied. The outcome
    /// is total and deterministic:
    /// - a rejection under a rejection-terminal definition errors the
    ///   instance immediately, regardless of remaining tasks;
    /// - otherwise, zero open tasks with auto-close enabled completes
    ///   the instance;
    /// - otherwise the instance remains running.
    #[must_use]
    pub const fn evaluate_close(
        policy: DefinitionPolicy,
        decision: TaskDecision,
        open_tasks: u64,
    ) -> CloseOutcome {
        if policy.rejection_terminal && matches!(decision, TaskDecision::Rejected) {
            return CloseOutcome::Error;
        }
        if policy.auto_close && open_tasks == 0 {
            return CloseOutcome::Complete;
        }
        CloseOutcome::Remain
    }
}
