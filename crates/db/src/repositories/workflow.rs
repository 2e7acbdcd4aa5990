//! Workflow repository for instance and task lifecycle.
//!
//! Every mutation runs in its own transaction; the workflow event it
//! causes (`workflow.instance.created`, `workflow.task.completed`) is
//! staged through the outbox inside that same transaction.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, Statement,
    TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use atrium_core::outbox::{event_types, NewOutboxEvent};
use atrium_core::workflow::{
    CloseOutcome, DefinitionPolicy, TaskDecision, TaskStatus as CoreTaskStatus, WorkflowEngine,
    WorkflowError,
};
use atrium_shared::types::{
    TenantId, WorkflowDefinitionId, WorkflowInstanceId, WorkflowTaskId,
};

use crate::entities::{
    sea_orm_active_enums::{InstanceStatus, TaskStatus},
    workflow_definitions, workflow_instances, workflow_tasks,
};
use crate::repositories::outbox::OutboxRepository;

/// Input for starting a workflow instance.
#[derive(Debug, Clone)]
pub struct StartInstanceInput {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// The definition to instantiate.
    pub definition_id: WorkflowDefinitionId,
    /// Entity type the flow attaches to, e.g. `Invoice`.
    pub entity_type: String,
    /// Entity id the flow attaches to.
    pub entity_id: Uuid,
    /// Free-form context payload.
    pub context: Option<serde_json::Value>,
    /// Who is starting the instance.
    pub started_by: Option<Uuid>,
    /// Initial task to create with the instance, if any.
    pub initial_task: Option<InitialTaskInput>,
    /// Permits a second running instance for the same
    /// (definition, entity). Without it a duplicate start is a conflict.
    pub allow_concurrent: bool,
}

/// Initial task created together with a new instance.
#[derive(Debug, Clone, Default)]
pub struct InitialTaskInput {
    /// Task name; defaults to `"{workflow_name} Approval"` when empty.
    pub task_name: Option<String>,
    /// Role the task is assigned to.
    pub assigned_role: Option<String>,
    /// Specific user the task is assigned to.
    pub assigned_user_id: Option<Uuid>,
    /// When the task is due.
    pub due_at: Option<chrono::DateTime<chrono::FixedOffset>>,
}

/// Input for adding a task to a running instance.
#[derive(Debug, Clone)]
pub struct AddTaskInput {
    /// Task name. Required.
    pub task_name: String,
    /// Role the task is assigned to.
    pub assigned_role: Option<String>,
    /// Specific user the task is assigned to.
    pub assigned_user_id: Option<Uuid>,
    /// When the task is due.
    pub due_at: Option<chrono::DateTime<chrono::FixedOffset>>,
}

/// A freshly started instance with its initial task, if one was
/// requested.
#[derive(Debug, Clone)]
pub struct StartedInstance {
    /// The new instance, in `running` status.
    pub instance: workflow_instances::Model,
    /// The first task, when the input asked for one.
    pub initial_task: Option<workflow_tasks::Model>,
}

/// Workflow repository.
#[derive(Debug, Clone)]
pub struct WorkflowRepository {
    db: DatabaseConnection,
}

impl WorkflowRepository {
    /// Creates a new workflow repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Starts a workflow instance for an entity.
    ///
    /// Creates the instance at step 1, the initial pending task when one
    /// is requested, and a `workflow.instance.created` outbox event, all
    /// in one transaction. At most one running instance may exist per
    /// (definition, entity) unless the input allows concurrent
    /// instances.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The definition is not found or inactive
    /// - A running instance already exists for the entity
    /// - The database operation fails
    pub async fn start_instance(
        &self,
        input: StartInstanceInput,
    ) -> Result<StartedInstance, WorkflowError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        let started = Self::start_on(&txn, input).await?;

        txn.commit()
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        Ok(started)
    }

    /// Starts an instance on an already-open transaction, for callers
    /// composing the start into a larger unit of work.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::start_instance`].
    pub async fn start_on(
        txn: &DatabaseTransaction,
        input: StartInstanceInput,
    ) -> Result<StartedInstance, WorkflowError> {
        let definition = workflow_definitions::Entity::find_by_id(input.definition_id.into_inner())
            .filter(workflow_definitions::Column::TenantId.eq(input.tenant_id.into_inner()))
            .filter(workflow_definitions::Column::IsActive.eq(true))
            .one(txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or_else(|| WorkflowError::DefinitionNotFound(input.definition_id.into_inner()))?;

        if !input.allow_concurrent {
            // Serialize competing starts for the same entity; without
            // the lock two transactions can both pass the duplicate
            // check below and both commit.
            let lock_key = entity_lock_key(
                input.tenant_id,
                input.definition_id,
                &input.entity_type,
                input.entity_id,
            );
            txn.execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "SELECT pg_advisory_xact_lock($1)",
                [lock_key.into()],
            ))
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

            let duplicate = workflow_instances::Entity::find()
                .filter(workflow_instances::Column::TenantId.eq(input.tenant_id.into_inner()))
                .filter(
                    workflow_instances::Column::WorkflowDefinitionId
                        .eq(input.definition_id.into_inner()),
                )
                .filter(workflow_instances::Column::EntityType.eq(input.entity_type.clone()))
                .filter(workflow_instances::Column::EntityId.eq(input.entity_id))
                .filter(workflow_instances::Column::Status.eq(InstanceStatus::Running))
                .one(txn)
                .await
                .map_err(|e| WorkflowError::Database(e.to_string()))?;

            if duplicate.is_some() {
                return Err(WorkflowError::DuplicateActiveInstance {
                    entity_type: input.entity_type,
                    entity_id: input.entity_id,
                    definition_id: input.definition_id.into_inner(),
                });
            }
        }

        let now = Utc::now().into();
        let instance_id = WorkflowInstanceId::new().into_inner();

        let instance = workflow_instances::ActiveModel {
            id: Set(instance_id),
            tenant_id: Set(input.tenant_id.into_inner()),
            workflow_definition_id: Set(input.definition_id.into_inner()),
            entity_type: Set(input.entity_type.clone()),
            entity_id: Set(input.entity_id),
            status: Set(InstanceStatus::Running),
            current_step_no: Set(1),
            context: Set(input.context),
            started_by: Set(input.started_by),
            completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await
        .map_err(|e| WorkflowError::Database(e.to_string()))?;

        let initial_task = match input.initial_task {
            Some(task_input) => {
                let task_name = match task_input.task_name {
                    Some(name) if !name.trim().is_empty() => name,
                    _ => format!("{} Approval", definition.workflow_name),
                };

                let task = workflow_tasks::ActiveModel {
                    id: Set(WorkflowTaskId::new().into_inner()),
                    tenant_id: Set(input.tenant_id.into_inner()),
                    workflow_instance_id: Set(instance_id),
                    task_name: Set(task_name),
                    assigned_role: Set(task_input.assigned_role),
                    assigned_user_id: Set(task_input.assigned_user_id),
                    due_at: Set(task_input.due_at),
                    status: Set(TaskStatus::Pending),
                    decision: Set(None),
                    decision_notes: Set(None),
                    completed_by: Set(None),
                    completed_at: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(txn)
                .await
                .map_err(|e| WorkflowError::Database(e.to_string()))?;
                Some(task)
            }
            None => None,
        };

        let event = NewOutboxEvent::keyed(
            input.tenant_id,
            event_types::WORKFLOW_INSTANCE_CREATED,
            "WorkflowInstance",
            instance_id,
            json!({
                "workflow_instance_id": instance_id,
                "workflow_definition_id": input.definition_id,
                "workflow_name": definition.workflow_name,
                "entity_type": input.entity_type,
                "entity_id": input.entity_id,
            }),
        );
        OutboxRepository::append(txn, event)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        Ok(StartedInstance {
            instance,
            initial_task,
        })
    }

    /// Adds a task to a running instance.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The task name is empty
    /// - The instance is not found or not running
    /// - The database operation fails
    pub async fn add_task(
        &self,
        tenant_id: TenantId,
        instance_id: WorkflowInstanceId,
        input: AddTaskInput,
    ) -> Result<workflow_tasks::Model, WorkflowError> {
        if input.task_name.trim().is_empty() {
            return Err(WorkflowError::TaskNameRequired);
        }

        let instance = self.fetch_instance(tenant_id, instance_id).await?;
        WorkflowEngine::require_running(db_instance_status_to_core(&instance.status))?;

        let now = Utc::now().into();
        let task = workflow_tasks::ActiveModel {
            id: Set(WorkflowTaskId::new().into_inner()),
            tenant_id: Set(tenant_id.into_inner()),
            workflow_instance_id: Set(instance_id.into_inner()),
            task_name: Set(input.task_name),
            assigned_role: Set(input.assigned_role),
            assigned_user_id: Set(input.assigned_user_id),
            due_at: Set(input.due_at),
            status: Set(TaskStatus::Pending),
            decision: Set(None),
            decision_notes: Set(None),
            completed_by: Set(None),
            completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        task.insert(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))
    }

    /// Completes a task with a decision and evaluates the close cascade.
    ///
    /// In one transaction: the task is moved to its terminal status, a
    /// `workflow.task.completed` event is staged, and the owning
    /// instance is closed if the definition's policy says so (rejection
    /// under a rejection-terminal definition errors the instance; the
    /// last open task under an auto-close definition completes it).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The decision string is not recognized
    /// - The task or its instance is not found
    /// - The task already reached a decision
    /// - The instance is not running
    /// - The database operation fails
    pub async fn complete_task(
        &self,
        tenant_id: TenantId,
        task_id: WorkflowTaskId,
        decision: &str,
        decision_notes: Option<String>,
        completed_by: Option<Uuid>,
    ) -> Result<workflow_tasks::Model, WorkflowError> {
        let decision = TaskDecision::parse(decision)
            .ok_or_else(|| WorkflowError::UnknownDecision(decision.to_string()))?;

        let task = workflow_tasks::Entity::find_by_id(task_id.into_inner())
            .filter(workflow_tasks::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or_else(|| WorkflowError::TaskNotFound(task_id.into_inner()))?;

        let instance = self
            .fetch_instance(
                tenant_id,
                WorkflowInstanceId::from_uuid(task.workflow_instance_id),
            )
            .await?;
        WorkflowEngine::require_running(db_instance_status_to_core(&instance.status))?;

        let terminal =
            WorkflowEngine::complete_task(db_task_status_to_core(&task.status), decision)?;

        let definition = workflow_definitions::Entity::find_by_id(instance.workflow_definition_id)
            .one(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or(WorkflowError::DefinitionNotFound(
                instance.workflow_definition_id,
            ))?;

        let policy = DefinitionPolicy {
            auto_close: definition.auto_close,
            rejection_terminal: definition.rejection_terminal,
        };

        let now = Utc::now().into();
        let instance_id = instance.id;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        // Keyed on the open statuses: zero rows affected means a
        // concurrent completion reached the task first.
        let updated = workflow_tasks::Entity::update_many()
            .col_expr(
                workflow_tasks::Column::Status,
                Expr::value(core_task_status_to_db(terminal)),
            )
            .col_expr(
                workflow_tasks::Column::Decision,
                Expr::value(Some(decision.as_str().to_string())),
            )
            .col_expr(
                workflow_tasks::Column::DecisionNotes,
                Expr::value(decision_notes),
            )
            .col_expr(workflow_tasks::Column::CompletedBy, Expr::value(completed_by))
            .col_expr(workflow_tasks::Column::CompletedAt, Expr::value(Some(now)))
            .col_expr(workflow_tasks::Column::UpdatedAt, Expr::value(now))
            .filter(workflow_tasks::Column::Id.eq(task_id.into_inner()))
            .filter(
                workflow_tasks::Column::Status
                    .eq(TaskStatus::Pending)
                    .or(workflow_tasks::Column::Status.eq(TaskStatus::InProgress)),
            )
            .exec(&txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        if updated.rows_affected == 0 {
            let current = workflow_tasks::Entity::find_by_id(task_id.into_inner())
                .one(&txn)
                .await
                .map_err(|e| WorkflowError::Database(e.to_string()))?
                .ok_or_else(|| WorkflowError::TaskNotFound(task_id.into_inner()))?;
            return Err(WorkflowError::TaskAlreadyTerminal(db_task_status_to_core(
                &current.status,
            )));
        }

        let completed = workflow_tasks::Entity::find_by_id(task_id.into_inner())
            .one(&txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or_else(|| WorkflowError::TaskNotFound(task_id.into_inner()))?;

        // Open tasks remaining after this completion.
        let open_tasks = workflow_tasks::Entity::find()
            .filter(workflow_tasks::Column::WorkflowInstanceId.eq(instance_id))
            .filter(
                workflow_tasks::Column::Status
                    .eq(TaskStatus::Pending)
                    .or(workflow_tasks::Column::Status.eq(TaskStatus::InProgress)),
            )
            .count(&txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        let outcome = WorkflowEngine::evaluate_close(policy, decision, open_tasks);
        let instance_status = match outcome {
            CloseOutcome::Complete => {
                Self::close_instance(&txn, instance, InstanceStatus::Completed, now).await?;
                "completed"
            }
            CloseOutcome::Error => {
                Self::close_instance(&txn, instance, InstanceStatus::Errored, now).await?;
                "errored"
            }
            CloseOutcome::Remain => "running",
        };

        let event = NewOutboxEvent::keyed(
            tenant_id,
            event_types::WORKFLOW_TASK_COMPLETED,
            "WorkflowTask",
            completed.id,
            json!({
                "workflow_task_id": completed.id,
                "workflow_instance_id": instance_id,
                "task_name": completed.task_name,
                "decision": decision.as_str(),
                "instance_status": instance_status,
            }),
        );
        OutboxRepository::append(&txn, event)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        Ok(completed)
    }

    /// Cancels a running instance.
    ///
    /// Open tasks are left as they are; a cancelled instance simply
    /// stops accepting mutations.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The instance is not found
    /// - The instance is not running
    /// - The database operation fails
    pub async fn cancel_instance(
        &self,
        tenant_id: TenantId,
        instance_id: WorkflowInstanceId,
    ) -> Result<workflow_instances::Model, WorkflowError> {
        let instance = self.fetch_instance(tenant_id, instance_id).await?;
        WorkflowEngine::cancel(db_instance_status_to_core(&instance.status))?;

        let now = Utc::now().into();
        let mut active: workflow_instances::ActiveModel = instance.into();
        active.status = Set(InstanceStatus::Cancelled);
        active.completed_at = Set(Some(now));
        active.updated_at = Set(now);

        active
            .update(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))
    }

    /// Lists pending tasks past their due date.
    ///
    /// Overdue is a read-time condition; nothing transitions
    /// automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_overdue_tasks(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<workflow_tasks::Model>, WorkflowError> {
        workflow_tasks::Entity::find()
            .filter(workflow_tasks::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(workflow_tasks::Column::Status.eq(TaskStatus::Pending))
            .filter(workflow_tasks::Column::DueAt.lt(Utc::now()))
            .order_by_asc(workflow_tasks::Column::DueAt)
            .all(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))
    }

    /// Fetches an instance with all of its tasks, newest task first.
    ///
    /// # Errors
    ///
    /// Returns an error if the instance is not found or the query fails.
    pub async fn get_instance_with_tasks(
        &self,
        tenant_id: TenantId,
        instance_id: WorkflowInstanceId,
    ) -> Result<(workflow_instances::Model, Vec<workflow_tasks::Model>), WorkflowError> {
        let instance = self.fetch_instance(tenant_id, instance_id).await?;

        let tasks = workflow_tasks::Entity::find()
            .filter(workflow_tasks::Column::WorkflowInstanceId.eq(instance_id.into_inner()))
            .order_by_desc(workflow_tasks::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;

        Ok((instance, tasks))
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    async fn fetch_instance(
        &self,
        tenant_id: TenantId,
        instance_id: WorkflowInstanceId,
    ) -> Result<workflow_instances::Model, WorkflowError> {
        workflow_instances::Entity::find_by_id(instance_id.into_inner())
            .filter(workflow_instances::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or_else(|| WorkflowError::InstanceNotFound(instance_id.into_inner()))
    }

    async fn close_instance(
        txn: &DatabaseTransaction,
        instance: workflow_instances::Model,
        status: InstanceStatus,
        now: chrono::DateTime<chrono::FixedOffset>,
    ) -> Result<(), WorkflowError> {
        let mut active: workflow_instances::ActiveModel = instance.into();
        active.status = Set(status);
        active.completed_at = Set(Some(now));
        active.updated_at = Set(now);

        active
            .update(txn)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Advisory lock key for one (tenant, definition, entity) start group.
fn entity_lock_key(
    tenant_id: TenantId,
    definition_id: WorkflowDefinitionId,
    entity_type: &str,
    entity_id: Uuid,
) -> i64 {
    let mut hasher = DefaultHasher::new();
    tenant_id.into_inner().hash(&mut hasher);
    definition_id.into_inner().hash(&mut hasher);
    entity_type.hash(&mut hasher);
    entity_id.hash(&mut hasher);
    i64::from_ne_bytes(hasher.finish().to_ne_bytes())
}

// ============================================================================
// Conversion helpers
// ============================================================================

/// Converts the database instance status to the core status.
fn db_instance_status_to_core(
    status: &InstanceStatus,
) -> atrium_core::workflow::InstanceStatus {
    match status {
        InstanceStatus::Running => atrium_core::workflow::InstanceStatus::Running,
        InstanceStatus::Completed => atrium_core::workflow::InstanceStatus::Completed,
        InstanceStatus::Cancelled => atrium_core::workflow::InstanceStatus::Cancelled,
        InstanceStatus::Errored => atrium_core::workflow::InstanceStatus::Errored,
    }
}

/// Converts the database task status to the core status.
fn db_task_status_to_core(status: &TaskStatus) -> CoreTaskStatus {
    match status {
        TaskStatus::Pending => CoreTaskStatus::Pending,
        TaskStatus::InProgress => CoreTaskStatus::InProgress,
        TaskStatus::Completed => CoreTaskStatus::Completed,
        TaskStatus::Rejected => CoreTaskStatus::Rejected,
    }
}

/// Converts a core task status back to the database enum.
fn core_task_status_to_db(status: CoreTaskStatus) -> TaskStatus {
    match status {
        CoreTaskStatus::Pending => TaskStatus::Pending,
        CoreTaskStatus::InProgress => TaskStatus::InProgress,
        CoreTaskStatus::Completed => TaskStatus::Completed,
        CoreTaskStatus::Rejected => TaskStatus::Rejected,
    }
}
