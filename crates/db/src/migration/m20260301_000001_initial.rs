//! Initial database migration.
//!
//! Creates the enums, core tables, and indexes for the policy,
//! outbox, workflow, ledger, and document subsystems.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: POLICY RULES
        // ============================================================
        db.execute_unprepared(POLICY_RULES_SQL).await?;

        // ============================================================
        // PART 3: EVENT OUTBOX
        // ============================================================
        db.execute_unprepared(OUTBOX_EVENTS_SQL).await?;

        // ============================================================
        // PART 4: WORKFLOW RUNTIME
        // ============================================================
        db.execute_unprepared(WORKFLOW_DEFINITIONS_SQL).await?;
        db.execute_unprepared(WORKFLOW_INSTANCES_SQL).await?;
        db.execute_unprepared(WORKFLOW_TASKS_SQL).await?;

        // ============================================================
        // PART 5: MULTI-CURRENCY LEDGER
        // ============================================================
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        // ============================================================
        // PART 6: DOCUMENT LIFECYCLE
        // ============================================================
        db.execute_unprepared(DOCUMENT_VERSIONS_SQL).await?;
        db.execute_unprepared(DOCUMENT_OBLIGATIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Outbox delivery status
CREATE TYPE event_status AS ENUM ('pending', 'published', 'failed');

-- Workflow instance status
CREATE TYPE instance_status AS ENUM ('running', 'completed', 'cancelled', 'errored');

-- Workflow task status
CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'completed', 'rejected');

-- Ledger entry side
CREATE TYPE entry_side AS ENUM ('debit', 'credit');
";

const POLICY_RULES_SQL: &str = r"
CREATE TABLE policy_rules (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    country_code CHAR(2) NOT NULL,
    state_code VARCHAR(50),
    policy_area VARCHAR(50) NOT NULL,
    entity_type VARCHAR(100) NOT NULL,
    action_name VARCHAR(100) NOT NULL,
    priority SMALLINT NOT NULL DEFAULT 0,
    version INTEGER NOT NULL DEFAULT 1,
    effective_from DATE,
    effective_to DATE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    rules JSONB NOT NULL DEFAULT '{}',
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_policy_rules_lookup
    ON policy_rules (tenant_id, country_code, policy_area, entity_type, action_name)
    WHERE is_active;
";

const OUTBOX_EVENTS_SQL: &str = r"
CREATE TABLE outbox_events (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    event_type VARCHAR(100) NOT NULL,
    aggregate_type VARCHAR(100) NOT NULL,
    aggregate_id UUID NOT NULL,
    dedup_key VARCHAR(255),
    payload JSONB NOT NULL DEFAULT '{}',
    status event_status NOT NULL DEFAULT 'pending',
    retry_count INTEGER NOT NULL DEFAULT 0,
    available_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    published_at TIMESTAMPTZ,
    last_error TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Dispatch scan: eligible rows in available_at order
CREATE INDEX idx_outbox_events_dispatch
    ON outbox_events (status, available_at)
    WHERE status IN ('pending', 'failed');

CREATE INDEX idx_outbox_events_dedup_key ON outbox_events (tenant_id, dedup_key);
CREATE INDEX idx_outbox_events_aggregate ON outbox_events (aggregate_type, aggregate_id);
";

const WORKFLOW_DEFINITIONS_SQL: &str = r"
CREATE TABLE workflow_definitions (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    workflow_name VARCHAR(200) NOT NULL,
    description TEXT,
    auto_close BOOLEAN NOT NULL DEFAULT TRUE,
    rejection_terminal BOOLEAN NOT NULL DEFAULT FALSE,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const WORKFLOW_INSTANCES_SQL: &str = r"
CREATE TABLE workflow_instances (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    workflow_definition_id UUID NOT NULL REFERENCES workflow_definitions(id),
    entity_type VARCHAR(100) NOT NULL,
    entity_id UUID NOT NULL,
    status instance_status NOT NULL DEFAULT 'running',
    current_step_no INTEGER NOT NULL DEFAULT 1,
    context JSONB,
    started_by UUID,
    completed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Duplicate-running check on start; callers may opt into concurrent
-- instances, so this is not unique.
CREATE INDEX idx_workflow_instances_active
    ON workflow_instances (tenant_id, workflow_definition_id, entity_type, entity_id)
    WHERE status = 'running';

CREATE INDEX idx_workflow_instances_entity
    ON workflow_instances (tenant_id, entity_type, entity_id);
";

const WORKFLOW_TASKS_SQL: &str = r"
CREATE TABLE workflow_tasks (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    workflow_instance_id UUID NOT NULL REFERENCES workflow_instances(id),
    task_name VARCHAR(200) NOT NULL,
    assigned_role VARCHAR(50),
    assigned_user_id UUID,
    due_at TIMESTAMPTZ,
    status task_status NOT NULL DEFAULT 'pending',
    decision VARCHAR(50),
    decision_notes TEXT,
    completed_by UUID,
    completed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_workflow_tasks_instance ON workflow_tasks (workflow_instance_id, status);
CREATE INDEX idx_workflow_tasks_due ON workflow_tasks (tenant_id, due_at) WHERE status = 'pending';
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE multi_currency_ledger_entries (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    reference_type VARCHAR(100) NOT NULL,
    reference_id UUID NOT NULL,
    posting_date DATE NOT NULL,
    txn_currency CHAR(3) NOT NULL,
    txn_amount NUMERIC(14, 2) NOT NULL,
    base_currency CHAR(3) NOT NULL,
    base_amount NUMERIC(14, 2) NOT NULL,
    fx_rate NUMERIC(18, 8) NOT NULL,
    entry_side entry_side NOT NULL,
    notes TEXT,
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_ledger_entries_reference
    ON multi_currency_ledger_entries (tenant_id, reference_type, reference_id);
CREATE INDEX idx_ledger_entries_posting_date
    ON multi_currency_ledger_entries (tenant_id, posting_date);
";

const DOCUMENT_VERSIONS_SQL: &str = r"
CREATE TABLE document_versions (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    document_id UUID NOT NULL,
    version_no INTEGER NOT NULL,
    file_name VARCHAR(255) NOT NULL,
    storage_key VARCHAR(500) NOT NULL,
    checksum VARCHAR(128),
    uploaded_by UUID,
    uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (tenant_id, document_id, version_no)
);
";

const DOCUMENT_OBLIGATIONS_SQL: &str = r"
CREATE TABLE document_obligations (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    document_id UUID NOT NULL,
    obligation_type VARCHAR(100) NOT NULL,
    due_date DATE,
    status VARCHAR(50) NOT NULL DEFAULT 'Open',
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_document_obligations_due ON document_obligations (tenant_id, due_date);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS document_obligations;
DROP TABLE IF EXISTS document_versions;
DROP TABLE IF EXISTS multi_currency_ledger_entries;
DROP TABLE IF EXISTS workflow_tasks;
DROP TABLE IF EXISTS workflow_instances;
DROP TABLE IF EXISTS workflow_definitions;
DROP TABLE IF EXISTS outbox_events;
DROP TABLE IF EXISTS policy_rules;
DROP TYPE IF EXISTS entry_side;
DROP TYPE IF EXISTS task_status;
DROP TYPE IF EXISTS instance_status;
DROP TYPE IF EXISTS event_status;
";
