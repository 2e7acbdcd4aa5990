//! Country/state policy resolution for Atrium.
//!
//! This module implements the jurisdiction-aware policy rule engine:
//! versioned, dated, prioritized configuration rows that govern
//! country/state-specific behavior for a business action.
//!
//! # Modules
//!
//! - `types` - Policy domain types (PolicyRule, PolicyQuery, MatchResult)
//! - `error` - Policy-specific error types
//! - `resolver` - Deterministic rule matching

pub mod error;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod resolver_props;

pub use error::PolicyError;
pub use resolver::PolicyResolver;
pub use types::{MatchResult, PolicyQuery, PolicyRule};
