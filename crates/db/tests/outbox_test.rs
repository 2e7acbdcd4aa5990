//! Integration tests for the outbox repository.
//!
//! Requires a migrated Postgres database; tests skip when DATABASE_URL
//! is not set.

use std::env;

use sea_orm::{Database, DatabaseConnection};
use serde_json::json;
use uuid::Uuid;

use atrium_core::outbox::{event_types, NewOutboxEvent, OutboxError};
use atrium_db::entities::sea_orm_active_enums::EventStatus;
use atrium_db::repositories::outbox::OutboxRepository;
use atrium_shared::types::{OutboxEventId, TenantId};

async fn connect() -> Option<DatabaseConnection> {
    let url = env::var("DATABASE_URL").ok()?;
    Database::connect(&url).await.ok()
}

#[tokio::test]
async fn test_append_stages_pending_event_with_dedup_key() {
    let Some(db) = connect().await else { return };
    let tenant_id = TenantId::new();
    let invoice_id = Uuid::new_v4();

    let event = NewOutboxEvent::keyed(
        tenant_id,
        event_types::INVOICE_CREATED,
        "Invoice",
        invoice_id,
        json!({"invoice_id": invoice_id}),
    );

    let staged = OutboxRepository::append(&db, event).await.expect("append");

    assert_eq!(staged.status, EventStatus::Pending);
    assert_eq!(staged.retry_count, 0);
    assert_eq!(
        staged.dedup_key.as_deref(),
        Some(format!("invoice.created.{invoice_id}").as_str())
    );
    assert!(staged.published_at.is_none());
}

#[tokio::test]
async fn test_append_rejects_empty_event_type() {
    let Some(db) = connect().await else { return };

    let event = NewOutboxEvent {
        tenant_id: TenantId::new(),
        event_type: "  ".to_string(),
        aggregate_type: "Invoice".to_string(),
        aggregate_id: Uuid::new_v4(),
        dedup_key: None,
        payload: json!({}),
    };

    let result = OutboxRepository::append(&db, event).await;
    assert!(matches!(result, Err(OutboxError::Validation(_))));
}

#[tokio::test]
async fn test_append_all_and_list_by_status() {
    let Some(db) = connect().await else { return };
    let tenant_id = TenantId::new();

    let events = vec![
        NewOutboxEvent::keyed(
            tenant_id,
            event_types::LEASE_CREATED,
            "Lease",
            Uuid::new_v4(),
            json!({}),
        ),
        NewOutboxEvent::keyed(
            tenant_id,
            event_types::INVOICE_CREATED,
            "Invoice",
            Uuid::new_v4(),
            json!({}),
        ),
    ];

    let staged = OutboxRepository::append_all(&db, events)
        .await
        .expect("append batch");
    assert_eq!(staged.len(), 2);

    let repo = OutboxRepository::new(db);

    // A dispatcher running against the same database may publish these
    // before we look, so count across both statuses.
    let pending = repo
        .list_by_status(tenant_id, EventStatus::Pending, 10)
        .await
        .expect("list pending");
    let published = repo
        .list_by_status(tenant_id, EventStatus::Published, 10)
        .await
        .expect("list published");
    assert_eq!(pending.len() + published.len(), 2);

    let failed = repo
        .list_by_status(tenant_id, EventStatus::Failed, 10)
        .await
        .expect("list failed");
    assert!(failed.is_empty());
}

#[tokio::test]
async fn test_get_event_not_found() {
    let Some(db) = connect().await else { return };
    let repo = OutboxRepository::new(db);

    let event_id = OutboxEventId::new();
    let result = repo.get_event(TenantId::new(), event_id).await;

    match result {
        Err(OutboxError::EventNotFound(id)) => assert_eq!(id, event_id.into_inner()),
        other => panic!("Expected EventNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_requeue_rejects_non_failed_event() {
    let Some(db) = connect().await else { return };
    let tenant_id = TenantId::new();

    let staged = OutboxRepository::append(
        &db,
        NewOutboxEvent::keyed(
            tenant_id,
            event_types::PAYMENT_RECEIVED,
            "Payment",
            Uuid::new_v4(),
            json!({}),
        ),
    )
    .await
    .expect("append");

    let repo = OutboxRepository::new(db);
    let result = repo
        .requeue(tenant_id, OutboxEventId::from_uuid(staged.id))
        .await;

    assert!(matches!(result, Err(OutboxError::StateConflict { .. })));
}

#[tokio::test]
async fn test_mark_published_is_terminal() {
    let Some(db) = connect().await else { return };
    let tenant_id = TenantId::new();

    let staged = OutboxRepository::append(
        &db,
        NewOutboxEvent::keyed(
            tenant_id,
            event_types::DOCUMENT_UPLOADED,
            "Document",
            Uuid::new_v4(),
            json!({}),
        ),
    )
    .await
    .expect("append");

    let repo = OutboxRepository::new(db);

    // A concurrently running dispatcher may beat us to publishing; both
    // paths leave the event terminally published.
    let staged_id = OutboxEventId::from_uuid(staged.id);
    match repo.mark_published(tenant_id, staged_id).await {
        Ok(published) => {
            assert_eq!(published.status, EventStatus::Published);
            assert!(published.published_at.is_some());
        }
        Err(OutboxError::StateConflict { .. }) => {}
        Err(other) => panic!("Unexpected error: {other:?}"),
    }

    // A second mark is a state conflict, not a silent no-op.
    let again = repo.mark_published(tenant_id, staged_id).await;
    assert!(matches!(again, Err(OutboxError::StateConflict { .. })));
}
