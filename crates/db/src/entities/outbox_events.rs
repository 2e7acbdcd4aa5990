//! `SeaORM` Entity for the outbox_events table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::EventStatus;

/// A staged domain event.
///
/// Rows are always written inside the same transaction as the business
/// change that caused them; the dispatcher later publishes them with
/// retry/backoff.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "outbox_events")]
pub struct Model {
    /// Event id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Event type, e.g. `invoice.created`.
    pub event_type: String,
    /// Aggregate type, e.g. `Invoice`.
    pub aggregate_type: String,
    /// Aggregate identifier.
    pub aggregate_id: Uuid,
    /// Optional deduplication key for at-least-once delivery.
    pub dedup_key: Option<String>,
    /// Structured event payload.
    pub payload: Json,
    /// Delivery status.
    pub status: EventStatus,
    /// Failed delivery attempts so far.
    pub retry_count: i32,
    /// Earliest next delivery attempt.
    pub available_at: DateTimeWithTimeZone,
    /// When the event was successfully published.
    pub published_at: Option<DateTimeWithTimeZone>,
    /// Error message from the last failed attempt.
    pub last_error: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
