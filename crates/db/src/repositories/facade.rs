//! Orchestration facade: one business operation, one transaction.
//!
//! A business write hands the facade a mutation closure. The facade
//! opens a transaction, runs the closure against it, applies the
//! declared side effects (ledger entries, document rows, outbox
//! events, an optional workflow start) on the same transaction, and
//! commits once. Any failure rolls the whole unit of work back, staged
//! events included.

use chrono::Utc;
use futures::future::BoxFuture;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DatabaseTransaction, Set, TransactionTrait};
use uuid::Uuid;

use atrium_core::outbox::NewOutboxEvent;
use atrium_core::policy::{MatchResult, PolicyQuery};
use atrium_shared::types::{DocumentId, LedgerEntryId, TenantId};
use atrium_shared::AppError;

use crate::entities::{
    document_obligations, document_versions, multi_currency_ledger_entries,
    sea_orm_active_enums::EntrySide,
};
use crate::repositories::outbox::OutboxRepository;
use crate::repositories::policy_rule::PolicyRuleRepository;
use crate::repositories::workflow::{StartInstanceInput, StartedInstance, WorkflowRepository};

/// A ledger entry to post as part of a unit of work.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// What the entry references, e.g. `Invoice`.
    pub reference_type: String,
    /// Id of the referenced aggregate.
    pub reference_id: Uuid,
    /// Posting date.
    pub posting_date: chrono::NaiveDate,
    /// Transaction currency (ISO 4217).
    pub txn_currency: String,
    /// Amount in the transaction currency.
    pub txn_amount: Decimal,
    /// Base currency (ISO 4217).
    pub base_currency: String,
    /// Amount in the base currency.
    pub base_amount: Decimal,
    /// Exchange rate applied (txn -> base).
    pub fx_rate: Decimal,
    /// Debit or credit.
    pub entry_side: EntrySide,
    /// Optional memo.
    pub notes: Option<String>,
    /// Who posted the entry.
    pub created_by: Option<Uuid>,
}

/// A document version to record as part of a unit of work.
#[derive(Debug, Clone)]
pub struct NewDocumentVersion {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Logical document.
    pub document_id: DocumentId,
    /// Version number, unique per document.
    pub version_no: i32,
    /// Original file name.
    pub file_name: String,
    /// Opaque storage key.
    pub storage_key: String,
    /// Optional content checksum.
    pub checksum: Option<String>,
    /// Who uploaded the version.
    pub uploaded_by: Option<Uuid>,
}

/// A document obligation to record as part of a unit of work.
#[derive(Debug, Clone)]
pub struct NewDocumentObligation {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Logical document.
    pub document_id: DocumentId,
    /// Obligation type, e.g. `renewal`.
    pub obligation_type: String,
    /// When the obligation falls due.
    pub due_date: Option<chrono::NaiveDate>,
    /// Optional notes.
    pub notes: Option<String>,
}

/// Side effects a mutation declares for atomic application.
///
/// Built inside the mutation closure, so effects can reference ids the
/// mutation just created.
#[derive(Debug, Clone, Default)]
pub struct SideEffects {
    /// Ledger entries to post.
    pub ledger_entries: Vec<NewLedgerEntry>,
    /// Document versions to record.
    pub document_versions: Vec<NewDocumentVersion>,
    /// Document obligations to record.
    pub document_obligations: Vec<NewDocumentObligation>,
    /// Outbox events to stage.
    pub events: Vec<NewOutboxEvent>,
    /// Workflow instance to start within the same unit.
    pub workflow_start: Option<StartInstanceInput>,
}

impl SideEffects {
    /// No side effects.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Adds an outbox event.
    #[must_use]
    pub fn with_event(mut self, event: NewOutboxEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Adds a ledger entry.
    #[must_use]
    pub fn with_ledger_entry(mut self, entry: NewLedgerEntry) -> Self {
        self.ledger_entries.push(entry);
        self
    }

    /// Adds a document version.
    #[must_use]
    pub fn with_document_version(mut self, version: NewDocumentVersion) -> Self {
        self.document_versions.push(version);
        self
    }

    /// Adds a document obligation.
    #[must_use]
    pub fn with_document_obligation(mut self, obligation: NewDocumentObligation) -> Self {
        self.document_obligations.push(obligation);
        self
    }

    /// Starts a workflow instance as part of the unit. The start stages
    /// its own `workflow.instance.created` event.
    #[must_use]
    pub fn with_workflow_start(mut self, input: StartInstanceInput) -> Self {
        self.workflow_start = Some(input);
        self
    }
}

/// Result of a committed unit of work.
#[derive(Debug)]
pub struct WriteOutcome<T> {
    /// The mutation's return value.
    pub value: T,
    /// The workflow instance started as a side effect, if any.
    pub workflow: Option<StartedInstance>,
}

/// The orchestration facade.
#[derive(Debug, Clone)]
pub struct Facade {
    db: DatabaseConnection,
}

impl Facade {
    /// Creates a new facade.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Runs a business mutation and its declared side effects as one
    /// atomic unit of work.
    ///
    /// The closure receives the open transaction and returns its result
    /// together with the side effects to apply. If the closure or any
    /// side-effect write fails, the transaction is dropped and rolls
    /// back; nothing is visible, no event is staged.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a database error from applying
    /// side effects or committing.
    pub async fn perform<T, F>(&self, mutation: F) -> Result<WriteOutcome<T>, AppError>
    where
        T: Send,
        F: for<'t> FnOnce(
                &'t DatabaseTransaction,
            ) -> BoxFuture<'t, Result<(T, SideEffects), AppError>>
            + Send,
    {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Dropping `txn` on any error path rolls the unit of work back.
        let (value, effects) = mutation(&txn).await?;
        let workflow = apply_side_effects(&txn, effects).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(WriteOutcome { value, workflow })
    }

    /// Like [`Self::perform`], with a policy resolution up front.
    ///
    /// The query is resolved read-only before the transaction opens and
    /// the result handed to the mutation, so the write can branch on the
    /// winning rule (or its absence) without doing its own lookup.
    ///
    /// # Errors
    ///
    /// Returns a policy resolution error, the closure's error, or a
    /// database error from applying side effects or committing.
    pub async fn perform_with_policy<T, F>(
        &self,
        tenant_id: TenantId,
        query: &PolicyQuery,
        mutation: F,
    ) -> Result<WriteOutcome<T>, AppError>
    where
        T: Send,
        F: for<'t> FnOnce(
                &'t DatabaseTransaction,
                MatchResult,
            ) -> BoxFuture<'t, Result<(T, SideEffects), AppError>>
            + Send,
    {
        let resolved = PolicyRuleRepository::new(self.db.clone())
            .resolve(tenant_id, query)
            .await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let (value, effects) = mutation(&txn, resolved).await?;
        let workflow = apply_side_effects(&txn, effects).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(WriteOutcome { value, workflow })
    }
}

async fn apply_side_effects(
    txn: &DatabaseTransaction,
    effects: SideEffects,
) -> Result<Option<StartedInstance>, AppError> {
    let now = Utc::now().into();

    for entry in effects.ledger_entries {
        multi_currency_ledger_entries::ActiveModel {
            id: Set(LedgerEntryId::new().into_inner()),
            tenant_id: Set(entry.tenant_id.into_inner()),
            reference_type: Set(entry.reference_type),
            reference_id: Set(entry.reference_id),
            posting_date: Set(entry.posting_date),
            txn_currency: Set(entry.txn_currency),
            txn_amount: Set(entry.txn_amount),
            base_currency: Set(entry.base_currency),
            base_amount: Set(entry.base_amount),
            fx_rate: Set(entry.fx_rate),
            entry_side: Set(entry.entry_side),
            notes: Set(entry.notes),
            created_by: Set(entry.created_by),
            created_at: Set(now),
        }
        .insert(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    }

    for version in effects.document_versions {
        document_versions::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(version.tenant_id.into_inner()),
            document_id: Set(version.document_id.into_inner()),
            version_no: Set(version.version_no),
            file_name: Set(version.file_name),
            storage_key: Set(version.storage_key),
            checksum: Set(version.checksum),
            uploaded_by: Set(version.uploaded_by),
            uploaded_at: Set(now),
        }
        .insert(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    }

    for obligation in effects.document_obligations {
        document_obligations::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(obligation.tenant_id.into_inner()),
            document_id: Set(obligation.document_id.into_inner()),
            obligation_type: Set(obligation.obligation_type),
            due_date: Set(obligation.due_date),
            status: Set("Open".to_string()),
            notes: Set(obligation.notes),
            created_at: Set(now),
        }
        .insert(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    }

    OutboxRepository::append_all(txn, effects.events)
        .await
        .map_err(AppError::from)?;

    let workflow = match effects.workflow_start {
        Some(input) => Some(
            WorkflowRepository::start_on(txn, input)
                .await
                .map_err(AppError::from)?,
        ),
        None => None,
    };

    Ok(workflow)
}
