//! Outbox dispatcher: claims staged events and delivers them to a sink.
//!
//! Multiple dispatcher processes may run against the same database.
//! Claiming is a compare-and-set on `(status, available_at)` that pushes
//! `available_at` forward by a short lease; a dispatcher whose update
//! matched zero rows lost the race and skips the event. Delivery is
//! therefore at-least-once, and sinks are expected to deduplicate on
//! `dedup_key`.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use atrium_core::outbox::{OutboxError, RetryPolicy};
use atrium_shared::config::DispatcherConfig;

use crate::entities::{outbox_events, sea_orm_active_enums::EventStatus};

/// Seconds an in-flight claim keeps an event invisible to other
/// dispatchers. Long enough for a delivery attempt, short enough that a
/// crashed dispatcher's events come back quickly.
const CLAIM_LEASE_SECS: i64 = 30;

/// A destination for dispatched events.
///
/// Implementations must tolerate repeated delivery of the same event:
/// the dispatcher guarantees at-least-once, never exactly-once.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Delivers one event. An `Err` marks the event failed and schedules
    /// a backoff retry.
    async fn deliver(&self, event: &outbox_events::Model) -> Result<(), OutboxError>;
}

/// Result of one dispatch batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Events successfully delivered and marked published.
    pub published: u64,
    /// Events whose delivery failed and were scheduled for retry.
    pub failed: u64,
    /// Events that exhausted their retries this batch and were left
    /// terminally failed.
    pub exhausted: u64,
    /// Events lost to a competing dispatcher's claim.
    pub skipped: u64,
}

/// Outbox dispatcher.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    db: DatabaseConnection,
    retry: RetryPolicy,
    batch_size: u64,
}

impl Dispatcher {
    /// Creates a dispatcher with the given retry policy and batch size.
    #[must_use]
    pub fn new(db: DatabaseConnection, retry: RetryPolicy, batch_size: u64) -> Self {
        Self {
            db,
            retry,
            batch_size: batch_size.max(1),
        }
    }

    /// Creates a dispatcher from application configuration.
    #[must_use]
    pub fn from_config(db: DatabaseConnection, config: &DispatcherConfig) -> Self {
        let retry = RetryPolicy::new(
            i64::try_from(config.backoff_base_secs).unwrap_or(i64::MAX),
            i64::try_from(config.backoff_cap_secs).unwrap_or(i64::MAX),
            config.max_retries,
        );
        Self::new(db, retry, config.batch_size)
    }

    /// Runs one dispatch batch against the sink.
    ///
    /// Fetches eligible events (pending or failed, available now, with
    /// retries remaining) in `available_at` order, claims each with a
    /// compare-and-set lease, delivers, and records the outcome. A sink
    /// failure never aborts the batch.
    ///
    /// # Errors
    ///
    /// Returns an error only if the eligibility query or an outcome
    /// write fails.
    pub async fn dispatch_batch(&self, sink: &dyn EventSink) -> Result<DispatchReport, OutboxError> {
        let now = Utc::now();

        let eligible = outbox_events::Entity::find()
            .filter(
                outbox_events::Column::Status
                    .eq(EventStatus::Pending)
                    .or(outbox_events::Column::Status.eq(EventStatus::Failed)),
            )
            .filter(outbox_events::Column::AvailableAt.lte(now))
            .filter(outbox_events::Column::RetryCount.lt(self.retry.max_retries()))
            .order_by_asc(outbox_events::Column::AvailableAt)
            .limit(self.batch_size)
            .all(&self.db)
            .await
            .map_err(|e| OutboxError::Database(e.to_string()))?;

        let mut report = DispatchReport::default();

        for event in eligible {
            if !self.claim(&event).await? {
                report.skipped += 1;
                continue;
            }

            match sink.deliver(&event).await {
                Ok(()) => {
                    self.mark_delivered(event).await?;
                    report.published += 1;
                }
                Err(err) => {
                    let exhausted = self.mark_failed(event, &err).await?;
                    if exhausted {
                        report.exhausted += 1;
                    } else {
                        report.failed += 1;
                    }
                }
            }
        }

        Ok(report)
    }

    /// Claims an event by pushing `available_at` forward, keyed on the
    /// exact `(status, available_at)` we read. Zero rows affected means
    /// another dispatcher got there first.
    async fn claim(&self, event: &outbox_events::Model) -> Result<bool, OutboxError> {
        let lease_until = Utc::now() + Duration::seconds(CLAIM_LEASE_SECS);

        let result = outbox_events::Entity::update_many()
            .col_expr(outbox_events::Column::AvailableAt, Expr::value(lease_until))
            .filter(outbox_events::Column::Id.eq(event.id))
            .filter(outbox_events::Column::Status.eq(event.status.clone()))
            .filter(outbox_events::Column::AvailableAt.eq(event.available_at))
            .exec(&self.db)
            .await
            .map_err(|e| OutboxError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn mark_delivered(&self, event: outbox_events::Model) -> Result<(), OutboxError> {
        let mut active: outbox_events::ActiveModel = event.into();
        active.status = Set(EventStatus::Published);
        active.published_at = Set(Some(Utc::now().into()));
        active.last_error = Set(None);

        active
            .update(&self.db)
            .await
            .map_err(|e| OutboxError::Database(e.to_string()))?;
        Ok(())
    }

    /// Records a failed attempt. Returns true when the event has now
    /// exhausted its retries and will not be picked up again.
    async fn mark_failed(
        &self,
        event: outbox_events::Model,
        err: &OutboxError,
    ) -> Result<bool, OutboxError> {
        let attempts = event.retry_count + 1;
        let exhausted = self.retry.is_exhausted(attempts);
        let next_at = self.retry.next_available_at(Utc::now(), attempts);

        tracing::warn!(
            event_id = %event.id,
            event_type = %event.event_type,
            attempts,
            exhausted,
            error = %err,
            "outbox delivery failed"
        );

        let mut active: outbox_events::ActiveModel = event.into();
        active.status = Set(EventStatus::Failed);
        active.retry_count = Set(attempts);
        active.available_at = Set(next_at.into());
        active.last_error = Set(Some(err.to_string()));

        active
            .update(&self.db)
            .await
            .map_err(|e| OutboxError::Database(e.to_string()))?;
        Ok(exhausted)
    }
}

// ============================================================================
// Sinks
// ============================================================================

/// Sink that emits each event as a structured log line.
///
/// The default sink for the dispatcher binary when no broker is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSink;

#[async_trait]
impl EventSink for LoggingSink {
    async fn deliver(&self, event: &outbox_events::Model) -> Result<(), OutboxError> {
        tracing::info!(
            event_id = %event.id,
            tenant_id = %event.tenant_id,
            event_type = %event.event_type,
            aggregate_type = %event.aggregate_type,
            aggregate_id = %event.aggregate_id,
            "event published"
        );
        Ok(())
    }
}

/// In-memory sink that records delivered events and deduplicates on
/// `dedup_key`. Used by tests and local smoke runs; can be primed to
/// fail specific event types to exercise the retry path.
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<outbox_events::Model>>,
    seen_keys: Mutex<HashSet<String>>,
    failing_types: Mutex<HashSet<String>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes deliveries of the given event type fail until cleared.
    pub fn fail_event_type(&self, event_type: &str) {
        if let Ok(mut failing) = self.failing_types.lock() {
            failing.insert(event_type.to_string());
        }
    }

    /// Clears all injected failures.
    pub fn clear_failures(&self) {
        if let Ok(mut failing) = self.failing_types.lock() {
            failing.clear();
        }
    }

    /// Events accepted so far, duplicates excluded.
    #[must_use]
    pub fn delivered(&self) -> Vec<outbox_events::Model> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn deliver(&self, event: &outbox_events::Model) -> Result<(), OutboxError> {
        {
            let failing = self
                .failing_types
                .lock()
                .map_err(|_| OutboxError::Delivery("sink lock poisoned".to_string()))?;
            if failing.contains(&event.event_type) {
                return Err(OutboxError::Delivery(format!(
                    "injected failure for {}",
                    event.event_type
                )));
            }
        }

        if let Some(key) = &event.dedup_key {
            let mut seen = self
                .seen_keys
                .lock()
                .map_err(|_| OutboxError::Delivery("sink lock poisoned".to_string()))?;
            if !seen.insert(key.clone()) {
                // Duplicate delivery of an already-accepted event is a no-op.
                return Ok(());
            }
        }

        self.delivered
            .lock()
            .map_err(|_| OutboxError::Delivery("sink lock poisoned".to_string()))?
            .push(event.clone());
        Ok(())
    }
}
