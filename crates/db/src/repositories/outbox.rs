//! Outbox event repository.
//!
//! Appending is exposed as an associated function generic over the
//! connection so business writes can stage events inside their own open
//! transaction. Everything else (listing, operator triage) runs against
//! the pooled connection.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use atrium_core::outbox::{NewOutboxEvent, OutboxError};
use atrium_shared::types::{OutboxEventId, TenantId};

use crate::entities::{outbox_events, sea_orm_active_enums::EventStatus};

/// Outbox event repository.
#[derive(Debug, Clone)]
pub struct OutboxRepository {
    db: DatabaseConnection,
}

impl OutboxRepository {
    /// Creates a new outbox repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stages an event on the given connection.
    ///
    /// Callers performing a business write MUST pass their open
    /// transaction so the event commits or rolls back with the change
    /// that caused it. The row is created `pending` and immediately
    /// available for dispatch.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `event_type` or `aggregate_type` is empty
    /// - The insert fails
    pub async fn append<C: ConnectionTrait>(
        conn: &C,
        event: NewOutboxEvent,
    ) -> Result<outbox_events::Model, OutboxError> {
        if event.event_type.trim().is_empty() {
            return Err(OutboxError::Validation("event_type is required".to_string()));
        }
        if event.aggregate_type.trim().is_empty() {
            return Err(OutboxError::Validation(
                "aggregate_type is required".to_string(),
            ));
        }

        let now = Utc::now().into();
        let row = outbox_events::ActiveModel {
            id: Set(OutboxEventId::new().into_inner()),
            tenant_id: Set(event.tenant_id.into_inner()),
            event_type: Set(event.event_type),
            aggregate_type: Set(event.aggregate_type),
            aggregate_id: Set(event.aggregate_id),
            dedup_key: Set(event.dedup_key),
            payload: Set(event.payload),
            status: Set(EventStatus::Pending),
            retry_count: Set(0),
            available_at: Set(now),
            published_at: Set(None),
            last_error: Set(None),
            created_at: Set(now),
        };

        row.insert(conn)
            .await
            .map_err(|e| OutboxError::Database(e.to_string()))
    }

    /// Stages a batch of events on the given connection.
    ///
    /// # Errors
    ///
    /// Returns an error if any event fails validation or insertion; the
    /// caller's transaction decides whether earlier inserts survive.
    pub async fn append_all<C: ConnectionTrait>(
        conn: &C,
        events: Vec<NewOutboxEvent>,
    ) -> Result<Vec<outbox_events::Model>, OutboxError> {
        let mut staged = Vec::with_capacity(events.len());
        for event in events {
            staged.push(Self::append(conn, event).await?);
        }
        Ok(staged)
    }

    /// Fetches a single event by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or the query fails.
    pub async fn get_event(
        &self,
        tenant_id: TenantId,
        event_id: OutboxEventId,
    ) -> Result<outbox_events::Model, OutboxError> {
        outbox_events::Entity::find_by_id(event_id.into_inner())
            .filter(outbox_events::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(|e| OutboxError::Database(e.to_string()))?
            .ok_or(OutboxError::EventNotFound(event_id.into_inner()))
    }

    /// Lists a tenant's events in a given status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_status(
        &self,
        tenant_id: TenantId,
        status: EventStatus,
        limit: u64,
    ) -> Result<Vec<outbox_events::Model>, OutboxError> {
        outbox_events::Entity::find()
            .filter(outbox_events::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(outbox_events::Column::Status.eq(status))
            .order_by_asc(outbox_events::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| OutboxError::Database(e.to_string()))
    }

    /// Requeues a failed event for another round of delivery attempts.
    ///
    /// Operator triage action: resets the retry count and makes the
    /// event immediately available. Only `failed` events qualify.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The event is not found
    /// - The event is not in `failed` status
    /// - The database operation fails
    pub async fn requeue(
        &self,
        tenant_id: TenantId,
        event_id: OutboxEventId,
    ) -> Result<outbox_events::Model, OutboxError> {
        let event = self.get_event(tenant_id, event_id).await?;

        if event.status != EventStatus::Failed {
            return Err(OutboxError::StateConflict {
                id: event.id,
                status: db_status_to_core(&event.status),
            });
        }

        let mut active: outbox_events::ActiveModel = event.into();
        active.status = Set(EventStatus::Pending);
        active.retry_count = Set(0);
        active.available_at = Set(Utc::now().into());
        active.last_error = Set(None);

        active
            .update(&self.db)
            .await
            .map_err(|e| OutboxError::Database(e.to_string()))
    }

    /// Marks an event published without delivering it.
    ///
    /// Operator triage action for events whose downstream effect was
    /// applied out of band. Published events are terminal and rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The event is not found
    /// - The event is already `published`
    /// - The database operation fails
    pub async fn mark_published(
        &self,
        tenant_id: TenantId,
        event_id: OutboxEventId,
    ) -> Result<outbox_events::Model, OutboxError> {
        let event = self.get_event(tenant_id, event_id).await?;

        if event.status == EventStatus::Published {
            return Err(OutboxError::StateConflict {
                id: event.id,
                status: db_status_to_core(&event.status),
            });
        }

        let mut active: outbox_events::ActiveModel = event.into();
        active.status = Set(EventStatus::Published);
        active.published_at = Set(Some(Utc::now().into()));
        active.last_error = Set(None);

        active
            .update(&self.db)
            .await
            .map_err(|e| OutboxError::Database(e.to_string()))
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

/// Converts the database status enum to the core status enum.
pub(crate) fn db_status_to_core(status: &EventStatus) -> atrium_core::outbox::EventStatus {
    match status {
        EventStatus::Pending => atrium_core::outbox::EventStatus::Pending,
        EventStatus::Published => atrium_core::outbox::EventStatus::Published,
        EventStatus::Failed => atrium_core::outbox::EventStatus::Failed,
    }
}
