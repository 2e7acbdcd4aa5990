//! `SeaORM` Entity for the policy_rules table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A country/state policy rule row.
///
/// Rules are never physically deleted - they are deactivated or
/// superseded by a row with a higher version.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "policy_rules")]
pub struct Model {
    /// Row id (also the final resolution tie-breaker).
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    /// Optional state/region restriction.
    pub state_code: Option<String>,
    /// Policy area, e.g. "tax".
    pub policy_area: String,
    /// Entity type the rule governs.
    pub entity_type: String,
    /// Action the rule governs.
    pub action_name: String,
    /// Priority for rule selection (higher value wins).
    pub priority: i16,
    /// Version number within a rule lineage.
    pub version: i32,
    /// First day the rule applies (inclusive).
    pub effective_from: Option<Date>,
    /// Last day the rule applies (inclusive).
    pub effective_to: Option<Date>,
    /// Whether the rule participates in resolution.
    pub is_active: bool,
    /// Opaque rules payload interpreted by the policy-area consumer.
    pub rules: Json,
    /// Administrator who created the rule.
    pub created_by: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
