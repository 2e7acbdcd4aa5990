//! Workflow runtime state machine for Atrium.
//!
//! This module implements the pure half of the workflow runtime: the
//! instance/task status models, transition validation, and the
//! close-on-completion evaluation. Persistence and the outbox wiring
//! live in the db layer.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (statuses, decisions, close outcome)
//! - `error` - Workflow-specific error types
//! - `service` - State transition and instance-close logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use service::WorkflowEngine;
pub use types::{CloseOutcome, DefinitionPolicy, InstanceStatus, TaskDecision, TaskStatus};
