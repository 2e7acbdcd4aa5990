//! `SeaORM` Entity for the workflow_instances table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::InstanceStatus;

/// A running approval/process flow for one entity.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "workflow_instances")]
pub struct Model {
    /// Instance id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// The definition this instance follows.
    pub workflow_definition_id: Uuid,
    /// Entity type the flow is attached to, e.g. `Invoice`.
    pub entity_type: String,
    /// Entity id the flow is attached to.
    pub entity_id: Uuid,
    /// Instance status.
    pub status: InstanceStatus,
    /// Current step number, starting at 1.
    pub current_step_no: i32,
    /// Free-form context payload.
    pub context: Option<Json>,
    /// Who started the instance.
    pub started_by: Option<Uuid>,
    /// When the instance reached a terminal close.
    pub completed_at: Option<DateTimeWithTimeZone>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workflow_definitions::Entity",
        from = "Column::WorkflowDefinitionId",
        to = "super::workflow_definitions::Column::Id"
    )]
    WorkflowDefinitions,
    #[sea_orm(has_many = "super::workflow_tasks::Entity")]
    WorkflowTasks,
}

impl Related<super::workflow_definitions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkflowDefinitions.def()
    }
}

impl Related<super::workflow_tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkflowTasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
