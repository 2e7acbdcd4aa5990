//! Database enum mappings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Delivery status of an outbox event.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "event_status")]
pub enum EventStatus {
    /// Staged, not yet delivered.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Delivered successfully.
    #[sea_orm(string_value = "published")]
    Published,
    /// Last delivery attempt failed.
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// Status of a workflow instance.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "instance_status")]
pub enum InstanceStatus {
    /// Active, accepts tasks.
    #[sea_orm(string_value = "running")]
    Running,
    /// Closed successfully.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Cancelled by an operator.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Terminated by a rejected task.
    #[sea_orm(string_value = "errored")]
    Errored,
}

/// Status of a workflow task.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_status")]
pub enum TaskStatus {
    /// Awaiting action.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Picked up by the assignee.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Approved and closed.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Rejected and closed.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Side of a multi-currency ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_side")]
pub enum EntrySide {
    /// Debit entry.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Credit entry.
    #[sea_orm(string_value = "credit")]
    Credit,
}
