//! `SeaORM` Entity for the document_obligations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A dated obligation attached to a managed document (renewal,
/// attestation, filing).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "document_obligations")]
pub struct Model {
    /// Obligation row id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// The document the obligation is attached to.
    pub document_id: Uuid,
    /// Obligation type, e.g. `renewal`.
    pub obligation_type: String,
    /// When the obligation falls due.
    pub due_date: Option<Date>,
    /// Obligation status, e.g. `Open`.
    pub status: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
