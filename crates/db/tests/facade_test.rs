//! Integration tests for the orchestration facade.
//!
//! Requires a migrated Postgres database; tests skip when DATABASE_URL
//! is not set.

use std::env;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter};
use serde_json::json;
use uuid::Uuid;

use atrium_core::outbox::{event_types, NewOutboxEvent};
use atrium_core::policy::PolicyQuery;
use atrium_db::entities::{
    multi_currency_ledger_entries, outbox_events,
    sea_orm_active_enums::{EntrySide, InstanceStatus},
    workflow_definitions,
};
use atrium_db::repositories::facade::{Facade, NewLedgerEntry, SideEffects, WriteOutcome};
use atrium_db::repositories::policy_rule::{CreatePolicyRuleInput, PolicyRuleRepository};
use atrium_db::repositories::workflow::{InitialTaskInput, StartInstanceInput};
use atrium_shared::types::{TenantId, WorkflowDefinitionId};
use atrium_shared::AppError;

async fn connect() -> Option<DatabaseConnection> {
    let url = env::var("DATABASE_URL").ok()?;
    Database::connect(&url).await.ok()
}

fn ledger_entry(tenant_id: TenantId, invoice_id: Uuid) -> NewLedgerEntry {
    NewLedgerEntry {
        tenant_id,
        reference_type: "Invoice".to_string(),
        reference_id: invoice_id,
        posting_date: NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date"),
        txn_currency: "EUR".to_string(),
        txn_amount: dec!(1000.00),
        base_currency: "AED".to_string(),
        base_amount: dec!(3950.00),
        fx_rate: dec!(3.95000000),
        entry_side: EntrySide::Debit,
        notes: None,
        created_by: None,
    }
}

async fn count_rows(db: &DatabaseConnection, tenant_id: TenantId) -> (usize, usize) {
    let entries = multi_currency_ledger_entries::Entity::find()
        .filter(multi_currency_ledger_entries::Column::TenantId.eq(tenant_id.into_inner()))
        .all(db)
        .await
        .expect("list entries");
    let events = outbox_events::Entity::find()
        .filter(outbox_events::Column::TenantId.eq(tenant_id.into_inner()))
        .all(db)
        .await
        .expect("list events");
    (entries.len(), events.len())
}

#[tokio::test]
async fn test_perform_commits_mutation_and_side_effects_together() {
    let Some(db) = connect().await else { return };
    let facade = Facade::new(db.clone());
    let tenant_id = TenantId::new();

    let outcome = facade
        .perform(move |_txn| {
            Box::pin(async move {
                let invoice_id = Uuid::now_v7();
                let effects = SideEffects::none()
                    .with_ledger_entry(ledger_entry(tenant_id, invoice_id))
                    .with_event(NewOutboxEvent::keyed(
                        tenant_id,
                        event_types::INVOICE_CREATED,
                        "Invoice",
                        invoice_id,
                        json!({"invoice_id": invoice_id}),
                    ));
                Ok((invoice_id, effects))
            })
        })
        .await
        .expect("perform");
    let invoice_id = outcome.value;
    assert!(outcome.workflow.is_none());

    let (entries, events) = count_rows(&db, tenant_id).await;
    assert_eq!(entries, 1);
    assert_eq!(events, 1);

    let event = outbox_events::Entity::find()
        .filter(outbox_events::Column::TenantId.eq(tenant_id.into_inner()))
        .one(&db)
        .await
        .expect("find event")
        .expect("event exists");
    assert_eq!(event.aggregate_id, invoice_id);
    assert_eq!(
        event.dedup_key.as_deref(),
        Some(format!("invoice.created.{invoice_id}").as_str())
    );
}

#[tokio::test]
async fn test_perform_failure_rolls_back_everything() {
    let Some(db) = connect().await else { return };
    let facade = Facade::new(db.clone());
    let tenant_id = TenantId::new();

    let result: Result<WriteOutcome<Uuid>, AppError> = facade
        .perform(move |txn| {
            Box::pin(async move {
                // A write that must not survive the rollback.
                let invoice_id = Uuid::now_v7();
                atrium_db::repositories::outbox::OutboxRepository::append(
                    txn,
                    NewOutboxEvent::keyed(
                        tenant_id,
                        event_types::INVOICE_CREATED,
                        "Invoice",
                        invoice_id,
                        json!({}),
                    ),
                )
                .await?;

                Err(AppError::Validation("amount must be positive".to_string()))
            })
        })
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));

    let (entries, events) = count_rows(&db, tenant_id).await;
    assert_eq!(entries, 0);
    assert_eq!(events, 0);
}

#[tokio::test]
async fn test_perform_invalid_event_aborts_the_unit_of_work() {
    let Some(db) = connect().await else { return };
    let facade = Facade::new(db.clone());
    let tenant_id = TenantId::new();

    let result: Result<WriteOutcome<()>, AppError> = facade
        .perform(move |_txn| {
            Box::pin(async move {
                let invoice_id = Uuid::now_v7();
                let effects = SideEffects::none()
                    .with_ledger_entry(ledger_entry(tenant_id, invoice_id))
                    .with_event(NewOutboxEvent {
                        tenant_id,
                        event_type: String::new(),
                        aggregate_type: "Invoice".to_string(),
                        aggregate_id: invoice_id,
                        dedup_key: None,
                        payload: json!({}),
                    });
                Ok(((), effects))
            })
        })
        .await;

    assert!(result.is_err());

    // The ledger entry must not have survived the failed event append.
    let (entries, events) = count_rows(&db, tenant_id).await;
    assert_eq!(entries, 0);
    assert_eq!(events, 0);
}

async fn seed_definition(
    db: &DatabaseConnection,
    tenant_id: TenantId,
) -> workflow_definitions::Model {
    use sea_orm::{ActiveModelTrait, Set};

    let now = chrono::Utc::now().into();
    workflow_definitions::ActiveModel {
        id: Set(Uuid::now_v7()),
        tenant_id: Set(tenant_id.into_inner()),
        workflow_name: Set("Invoice Posting".to_string()),
        description: Set(None),
        auto_close: Set(true),
        rejection_terminal: Set(false),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("seed definition")
}

#[tokio::test]
async fn test_perform_starts_workflow_in_same_unit() {
    let Some(db) = connect().await else { return };
    let facade = Facade::new(db.clone());
    let tenant_id = TenantId::new();
    let definition = seed_definition(&db, tenant_id).await;
    let definition_id = WorkflowDefinitionId::from_uuid(definition.id);

    let outcome = facade
        .perform(move |_txn| {
            Box::pin(async move {
                let invoice_id = Uuid::now_v7();
                let effects = SideEffects::none()
                    .with_ledger_entry(ledger_entry(tenant_id, invoice_id))
                    .with_workflow_start(StartInstanceInput {
                        tenant_id,
                        definition_id,
                        entity_type: "Invoice".to_string(),
                        entity_id: invoice_id,
                        context: None,
                        started_by: None,
                        initial_task: Some(InitialTaskInput::default()),
                        allow_concurrent: false,
                    });
                Ok((invoice_id, effects))
            })
        })
        .await
        .expect("perform");

    let started = outcome.workflow.expect("workflow started");
    assert_eq!(started.instance.status, InstanceStatus::Running);
    assert_eq!(started.instance.entity_id, outcome.value);
    let task = started.initial_task.expect("initial task");
    assert_eq!(task.task_name, "Invoice Posting Approval");

    // One ledger row and the instance-created event, committed together.
    let (entries, events) = count_rows(&db, tenant_id).await;
    assert_eq!(entries, 1);
    assert_eq!(events, 1);
}

#[tokio::test]
async fn test_perform_with_policy_hands_winning_rule_to_mutation() {
    let Some(db) = connect().await else { return };
    let tenant_id = TenantId::new();
    let rules = PolicyRuleRepository::new(db.clone());
    rules
        .create_rule(CreatePolicyRuleInput {
            tenant_id,
            country_code: "AE".to_string(),
            state_code: None,
            policy_area: "tax".to_string(),
            entity_type: "Invoice".to_string(),
            action_name: "post_invoice".to_string(),
            priority: 10,
            effective_from: None,
            effective_to: None,
            rules: json!({"vat_rate": "0.05"}),
            created_by: None,
        })
        .await
        .expect("create rule");

    let facade = Facade::new(db.clone());
    let query = PolicyQuery {
        country_code: "AE".to_string(),
        state_code: None,
        policy_area: "tax".to_string(),
        entity_type: "Invoice".to_string(),
        action_name: "post_invoice".to_string(),
        effective_on: NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date"),
    };

    let outcome = facade
        .perform_with_policy(tenant_id, &query, move |_txn, resolved| {
            Box::pin(async move {
                assert!(resolved.matched);
                let rule = resolved.rule.expect("winning rule");
                Ok((rule.rules["vat_rate"].clone(), SideEffects::none()))
            })
        })
        .await
        .expect("perform with policy");

    assert_eq!(outcome.value, json!("0.05"));
}
