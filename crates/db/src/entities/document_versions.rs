//! `SeaORM` Entity for the document_versions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One immutable version of a managed document.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "document_versions")]
pub struct Model {
    /// Version row id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// The document this version belongs to.
    pub document_id: Uuid,
    /// Monotonically increasing version number.
    pub version_no: i32,
    /// Original file name.
    pub file_name: String,
    /// Object storage key.
    pub storage_key: String,
    /// Content checksum.
    pub checksum: Option<String>,
    /// Who uploaded the version.
    pub uploaded_by: Option<Uuid>,
    /// Upload timestamp.
    pub uploaded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
