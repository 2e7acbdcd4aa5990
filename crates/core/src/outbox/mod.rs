//! Transactional event outbox domain logic.
//!
//! The outbox guarantees "write + notify" atomicity: events are staged
//! in the same transaction as the business write and published later by
//! an asynchronous dispatcher with retry/backoff.
//!
//! # Modules
//!
//! - `types` - Event status and domain event types
//! - `error` - Outbox-specific error types
//! - `retry` - Exponential backoff retry policy

pub mod error;
pub mod retry;
pub mod types;

pub use error::OutboxError;
pub use retry::RetryPolicy;
pub use types::{event_types, EventStatus, NewOutboxEvent};
