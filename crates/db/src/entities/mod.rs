//! `SeaORM` entity definitions.

pub mod document_obligations;
pub mod document_versions;
pub mod multi_currency_ledger_entries;
pub mod outbox_events;
pub mod policy_rules;
pub mod sea_orm_active_enums;
pub mod workflow_definitions;
pub mod workflow_instances;
pub mod workflow_tasks;
