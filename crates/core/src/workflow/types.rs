//! Workflow domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a workflow instance.
///
/// The only valid transitions are out of `Running`:
/// - Running → Completed (all required tasks approved)
/// - Running → Cancelled (explicit operator action)
/// - Running → Errored (rejection-terminal workflow saw a rejection)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    /// The instance is active and accepts tasks.
    Running,
    /// The instance closed successfully (terminal).
    Completed,
    /// The instance was cancelled by an operator (terminal).
    Cancelled,
    /// The instance was terminated by a rejected task (terminal).
    Errored,
}

impl InstanceStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Errored => "errored",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "errored" => Some(Self::Errored),
            _ => None,
        }
    }

    /// Returns true if no transition out of this status exists.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a workflow task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Created, awaiting action.
    Pending,
    /// Picked up by the assignee.
    InProgress,
    /// Approved and closed (terminal).
    Completed,
    /// Rejected and closed (terminal).
    Rejected,
}

impl TaskStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "inprogress",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "inprogress" | "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true while the task still counts against instance close.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    /// Returns true once the task has reached a decision.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The decision recorded when a task is completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskDecision {
    /// The task was approved.
    Approved,
    /// The task was rejected.
    Rejected,
}

impl TaskDecision {
    /// Returns the string representation of the decision.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a decision from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// The terminal task status this decision produces.
    #[must_use]
    pub const fn resulting_status(&self) -> TaskStatus {
        match self {
            Self::Approved => TaskStatus::Completed,
            Self::Rejected => TaskStatus::Rejected,
        }
    }
}

impl fmt::Display for TaskDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-definition behavior flags.
///
/// These are configuration on the workflow definition row, not
/// hard-coded per entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionPolicy {
    /// Close the instance automatically when its last open task
    /// completes.
    pub auto_close: bool,
    /// A rejected task terminates the instance as `Errored`.
    pub rejection_terminal: bool,
}

impl Default for DefinitionPolicy {
    fn default() -> Self {
        Self {
            auto_close: true,
            rejection_terminal: false,
        }
    }
}

/// The outcome of evaluating an instance after a task mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The instance stays `Running`.
    Remain,
    /// The instance transitions to `Completed`.
    Complete,
    /// The instance transitions to `Errored`.
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_status_roundtrip() {
        for status in [
            InstanceStatus::Running,
            InstanceStatus::Completed,
            InstanceStatus::Cancelled,
            InstanceStatus::Errored,
        ] {
            assert_eq!(InstanceStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(InstanceStatus::parse("invalid"), None);
    }

    #[test]
    fn test_instance_terminality() {
        assert!(!InstanceStatus::Running.is_terminal());
        assert!(InstanceStatus::Completed.is_terminal());
        assert!(InstanceStatus::Cancelled.is_terminal());
        assert!(InstanceStatus::Errored.is_terminal());
    }

    #[test]
    fn test_task_status_open() {
        assert!(TaskStatus::Pending.is_open());
        assert!(TaskStatus::InProgress.is_open());
        assert!(!TaskStatus::Completed.is_open());
        assert!(!TaskStatus::Rejected.is_open());
    }

    #[test]
    fn test_task_status_parse_variants() {
        assert_eq!(TaskStatus::parse("in_progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("InProgress"), Some(TaskStatus::InProgress));
    }

    #[test]
    fn test_decision_resulting_status() {
        assert_eq!(
            TaskDecision::Approved.resulting_status(),
            TaskStatus::Completed
        );
        assert_eq!(
            TaskDecision::Rejected.resulting_status(),
            TaskStatus::Rejected
        );
    }

    #[test]
    fn test_definition_policy_default() {
        let policy = DefinitionPolicy::default();
        assert!(policy.auto_close);
        assert!(!policy.rejection_terminal);
    }
}
