//! Outbox domain types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use atrium_shared::types::TenantId;

/// Well-known event type values.
///
/// The set is open: business-write handlers may stage any event type,
/// these are the ones the platform's own modules emit.
pub mod event_types {
    /// A lease agreement was created.
    pub const LEASE_CREATED: &str = "lease.created";
    /// An invoice was created.
    pub const INVOICE_CREATED: &str = "invoice.created";
    /// A payment was received and allocated.
    pub const PAYMENT_RECEIVED: &str = "payment.received";
    /// An invoice was revalued against a fresh FX rate.
    pub const INVOICE_REVALUED: &str = "invoice.revalued";
    /// A document was uploaded.
    pub const DOCUMENT_UPLOADED: &str = "document.uploaded";
    /// A new version of an existing document was uploaded.
    pub const DOCUMENT_VERSION_UPLOADED: &str = "document.version_uploaded";
    /// A workflow instance was started.
    pub const WORKFLOW_INSTANCE_CREATED: &str = "workflow.instance.created";
    /// A workflow task reached a terminal decision.
    pub const WORKFLOW_TASK_COMPLETED: &str = "workflow.task.completed";
}

/// Delivery status of an outbox event.
///
/// Events are created `Pending`, transition to `Published` on successful
/// delivery (terminal), or to `Failed` on a delivery error. A `Failed`
/// event is retried with backoff until the maximum retry count, after
/// which it stays `Failed` permanently for operator triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Staged, not yet delivered.
    Pending,
    /// Delivered successfully (terminal).
    Published,
    /// Last delivery attempt failed.
    Failed,
}

impl EventStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Published => "published",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "published" => Some(Self::Published),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A new event to stage in the outbox.
///
/// Staged rows inherit `status = Pending` and `available_at = now`; the
/// dedup key, when present, lets sinks treat repeated delivery of the
/// same event as a no-op (delivery is at-least-once, never exactly-once).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOutboxEvent {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Event type, e.g. `invoice.created`.
    pub event_type: String,
    /// Aggregate type, e.g. `Invoice`.
    pub aggregate_type: String,
    /// Aggregate identifier.
    pub aggregate_id: Uuid,
    /// Optional deduplication key.
    pub dedup_key: Option<String>,
    /// Structured event payload.
    pub payload: serde_json::Value,
}

impl NewOutboxEvent {
    /// Creates an event with a conventional `{event_type}.{aggregate_id}`
    /// dedup key.
    #[must_use]
    pub fn keyed(
        tenant_id: TenantId,
        event_type: &str,
        aggregate_type: &str,
        aggregate_id: Uuid,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            tenant_id,
            event_type: event_type.to_string(),
            aggregate_type: aggregate_type.to_string(),
            aggregate_id,
            dedup_key: Some(format!("{event_type}.{aggregate_id}")),
            payload,
        }
    }
}
