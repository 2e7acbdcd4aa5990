//! `SeaORM` Entity for the multi_currency_ledger_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::EntrySide;

/// A multi-currency ledger entry.
///
/// `fx_rate` is a snapshot produced by the out-of-core rate generator
/// keyed by (date, currency pair); entries are append-only.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "multi_currency_ledger_entries")]
pub struct Model {
    /// Entry id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Referenced aggregate type, e.g. `Invoice`, `Payment`.
    pub reference_type: String,
    /// Referenced aggregate id.
    pub reference_id: Uuid,
    /// Posting date.
    pub posting_date: Date,
    /// Transaction currency code.
    pub txn_currency: String,
    /// Amount in the transaction currency.
    pub txn_amount: Decimal,
    /// Tenant base currency code.
    pub base_currency: String,
    /// Amount converted to the base currency.
    pub base_amount: Decimal,
    /// FX rate snapshot used for the conversion.
    pub fx_rate: Decimal,
    /// Debit or credit.
    pub entry_side: EntrySide,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Who caused the entry.
    pub created_by: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
