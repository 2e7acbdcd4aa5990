//! Property-based tests for WorkflowEngine.
//!
//! These tests validate the totality and determinism of the state
//! machine using proptest for randomized input generation.

use proptest::prelude::*;

use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowEngine;
use crate::workflow::types::{CloseOutcome, DefinitionPolicy, InstanceStatus, TaskDecision, TaskStatus};

/// Strategy for generating random InstanceStatus values.
fn arb_instance_status() -> impl Strategy<Value = InstanceStatus> {
    prop_oneof![
        Just(InstanceStatus::Running),
        Just(InstanceStatus::Completed),
        Just(InstanceStatus::Cancelled),
        Just(InstanceStatus::Errored),
    ]
}

/// Strategy for generating random TaskStatus values.
fn arb_task_status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Pending),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Completed),
        Just(TaskStatus::Rejected),
    ]
}

/// Strategy for generating random decisions.
fn arb_decision() -> impl Strategy<Value = TaskDecision> {
    prop_oneof![Just(TaskDecision::Approved), Just(TaskDecision::Rejected)]
}

/// Strategy for generating definition policies.
fn arb_policy() -> impl Strategy<Value = DefinitionPolicy> {
    (any::<bool>(), any::<bool>()).prop_map(|(auto_close, rejection_terminal)| DefinitionPolicy {
        auto_close,
        rejection_terminal,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Terminal statuses admit no outgoing transition.
    #[test]
    fn prop_terminal_instances_are_stuck(from in arb_instance_status(), to in arb_instance_status()) {
        if from.is_terminal() {
            prop_assert!(!WorkflowEngine::is_valid_transition(from, to));
        }
    }

    /// Completing a task succeeds exactly when the task is open, and the
    /// resulting status always reflects the decision.
    #[test]
    fn prop_complete_task_total(current in arb_task_status(), decision in arb_decision()) {
        match WorkflowEngine::complete_task(current, decision) {
            Ok(new_status) => {
                prop_assert!(current.is_open());
                prop_assert_eq!(new_status, decision.resulting_status());
                prop_assert!(new_status.is_terminal());
            }
            Err(WorkflowError::TaskAlreadyTerminal(status)) => {
                prop_assert!(current.is_terminal());
                prop_assert_eq!(status, current);
            }
            Err(_) => prop_assert!(false, "unexpected error variant"),
        }
    }

    /// The close evaluation is deterministic and errors only on a
    /// rejection under a rejection-terminal definition.
    #[test]
    fn prop_evaluate_close_total(
        policy in arb_policy(),
        decision in arb_decision(),
        open_tasks in 0u64..10,
    ) {
        let outcome = WorkflowEngine::evaluate_close(policy, decision, open_tasks);
        prop_assert_eq!(outcome, WorkflowEngine::evaluate_close(policy, decision, open_tasks));

        match outcome {
            CloseOutcome::Error => {
                prop_assert!(policy.rejection_terminal);
                prop_assert_eq!(decision, TaskDecision::Rejected);
            }
            CloseOutcome::Complete => {
                prop_assert!(policy.auto_close);
                prop_assert_eq!(open_tasks, 0);
            }
            CloseOutcome::Remain => {
                // An instance may only remain running if it still has
                // open tasks or auto-close is disabled.
                prop_assert!(open_tasks > 0 || !policy.auto_close);
            }
        }
    }
}
