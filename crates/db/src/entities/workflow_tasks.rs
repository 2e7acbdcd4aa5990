//! `SeaORM` Entity for the workflow_tasks table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TaskStatus;

/// A unit of work/decision belonging to one workflow instance.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "workflow_tasks")]
pub struct Model {
    /// Task id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Owning instance.
    pub workflow_instance_id: Uuid,
    /// Task name.
    pub task_name: String,
    /// Role the task is assigned to.
    pub assigned_role: Option<String>,
    /// Specific user the task is assigned to.
    pub assigned_user_id: Option<Uuid>,
    /// When the task is due. Overdue is a read-time condition, never an
    /// automatic transition.
    pub due_at: Option<DateTimeWithTimeZone>,
    /// Task status.
    pub status: TaskStatus,
    /// Decision recorded at completion.
    pub decision: Option<String>,
    /// Notes recorded at completion.
    pub decision_notes: Option<String>,
    /// Who completed the task.
    pub completed_by: Option<Uuid>,
    /// When the task was completed.
    pub completed_at: Option<DateTimeWithTimeZone>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workflow_instances::Entity",
        from = "Column::WorkflowInstanceId",
        to = "super::workflow_instances::Column::Id"
    )]
    WorkflowInstances,
}

impl Related<super::workflow_instances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkflowInstances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
