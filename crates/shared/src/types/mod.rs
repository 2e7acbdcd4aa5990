//! Shared type definitions.

pub mod id;

pub use id::{
    DocumentId, LedgerEntryId, OutboxEventId, PolicyRuleId, TenantId, WorkflowDefinitionId,
    WorkflowInstanceId, WorkflowTaskId,
};
