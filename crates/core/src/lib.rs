//! Core business logic for Atrium.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, state machines, and resolution rules live here.
//!
//! # Modules
//!
//! - `policy` - Country/state policy rule resolution
//! - `outbox` - Domain event types and the delivery retry policy
//! - `workflow` - Workflow instance/task state machine

pub mod outbox;
pub mod policy;
pub mod workflow;
