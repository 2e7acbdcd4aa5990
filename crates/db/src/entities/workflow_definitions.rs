//! `SeaORM` Entity for the workflow_definitions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A workflow definition.
///
/// The `auto_close` and `rejection_terminal` flags are per-definition
/// configuration consulted by the runtime after every task completion.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "workflow_definitions")]
pub struct Model {
    /// Definition id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Human-readable workflow name.
    pub workflow_name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Close the instance when its last open task completes.
    pub auto_close: bool,
    /// A rejected task terminates the instance as errored.
    pub rejection_terminal: bool,
    /// Whether new instances may be started.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::workflow_instances::Entity")]
    WorkflowInstances,
}

impl Related<super::workflow_instances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkflowInstances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
