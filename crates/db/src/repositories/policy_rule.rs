//! Policy rule repository for jurisdiction-aware rule resolution.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use atrium_core::policy::{MatchResult, PolicyError, PolicyQuery, PolicyResolver, PolicyRule};
use atrium_shared::types::{PolicyRuleId, TenantId};

use crate::entities::policy_rules;

/// Input for creating a policy rule.
#[derive(Debug, Clone)]
pub struct CreatePolicyRuleInput {
    /// Owning tenant.
    pub tenant_id: TenantId,
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
    /// First day the rule applies (inclusive).
    pub effective_from: Option<chrono::NaiveDate>,
    /// Last day the rule applies (inclusive).
    pub effective_to: Option<chrono::NaiveDate>,
    /// Opaque rules payload.
    pub rules: serde_json::Value,
    /// Administrator creating the rule.
    pub created_by: Option<Uuid>,
}

/// Input for superseding an existing rule with a new version.
#[derive(Debug, Clone)]
pub struct SupersedeRuleInput {
    /// New priority, or `None` to keep the old one.
    pub priority: Option<i16>,
    /// New effective window start.
    pub effective_from: Option<chrono::NaiveDate>,
    /// New effective window end.
    pub effective_to: Option<chrono::NaiveDate>,
    /// New rules payload, or `None` to keep the old one.
    pub rules: Option<serde_json::Value>,
    /// Administrator superseding the rule.
    pub created_by: Option<Uuid>,
}

/// Policy rule repository.
///
/// Rules are never physically deleted: administration is create,
/// deactivate, and supersede (deactivate + insert a higher version).
#[derive(Debug, Clone)]
pub struct PolicyRuleRepository {
    db: DatabaseConnection,
}

impl PolicyRuleRepository {
    /// Creates a new policy rule repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves the winning policy rule for a query.
    ///
    /// Loads the tenant's active candidate rules and delegates ranking
    /// to [`PolicyResolver`]. A query that matches nothing is a normal
    /// outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A required query field is empty
    /// - The winning rule carries a malformed payload
    /// - The database query fails
    pub async fn resolve(
        &self,
        tenant_id: TenantId,
        query: &PolicyQuery,
    ) -> Result<MatchResult, PolicyError> {
        let candidates = policy_rules::Entity::find()
            .filter(policy_rules::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(policy_rules::Column::IsActive.eq(true))
            .filter(policy_rules::Column::CountryCode.eq(query.country_code.clone()))
            .filter(policy_rules::Column::PolicyArea.eq(query.policy_area.clone()))
            .filter(policy_rules::Column::EntityType.eq(query.entity_type.clone()))
            .filter(policy_rules::Column::ActionName.eq(query.action_name.clone()))
            .all(&self.db)
            .await
            .map_err(|e| PolicyError::Database(e.to_string()))?;

        let rules: Vec<PolicyRule> = candidates.into_iter().map(db_rule_to_core).collect();

        PolicyResolver::resolve(&rules, query)
    }

    /// Creates a new policy rule at version 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_rule(
        &self,
        input: CreatePolicyRuleInput,
    ) -> Result<policy_rules::Model, PolicyError> {
        let now = Utc::now().into();
        let rule = policy_rules::ActiveModel {
            id: Set(PolicyRuleId::new().into_inner()),
            tenant_id: Set(input.tenant_id.into_inner()),
            country_code: Set(input.country_code),
            state_code: Set(input.state_code),
            policy_area: Set(input.policy_area),
            entity_type: Set(input.entity_type),
            action_name: Set(input.action_name),
            priority: Set(input.priority),
            version: Set(1),
            effective_from: Set(input.effective_from),
            effective_to: Set(input.effective_to),
            is_active: Set(true),
            rules: Set(input.rules),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        rule.insert(&self.db)
            .await
            .map_err(|e| PolicyError::Database(e.to_string()))
    }

    /// Deactivates a rule, removing it from resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The rule is not found
    /// - The database operation fails
    pub async fn deactivate_rule(
        &self,
        tenant_id: TenantId,
        rule_id: PolicyRuleId,
    ) -> Result<policy_rules::Model, PolicyError> {
        let rule = self.fetch_rule(tenant_id, rule_id).await?;

        let mut active: policy_rules::ActiveModel = rule.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());

        active
            .update(&self.db)
            .await
            .map_err(|e| PolicyError::Database(e.to_string()))
    }

    /// Supersedes a rule: deactivates the current row and inserts a new
    /// one at the next version, carrying over fields the input leaves
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The rule is not found
    /// - The database operation fails
    pub async fn supersede_rule(
        &self,
        tenant_id: TenantId,
        rule_id: PolicyRuleId,
        input: SupersedeRuleInput,
    ) -> Result<policy_rules::Model, PolicyError> {
        let old = self.fetch_rule(tenant_id, rule_id).await?;
        let now = Utc::now().into();

        let replacement = policy_rules::ActiveModel {
            id: Set(PolicyRuleId::new().into_inner()),
            tenant_id: Set(old.tenant_id),
            country_code: Set(old.country_code.clone()),
            state_code: Set(old.state_code.clone()),
            policy_area: Set(old.policy_area.clone()),
            entity_type: Set(old.entity_type.clone()),
            action_name: Set(old.action_name.clone()),
            priority: Set(input.priority.unwrap_or(old.priority)),
            version: Set(old.version + 1),
            effective_from: Set(input.effective_from.or(old.effective_from)),
            effective_to: Set(input.effective_to.or(old.effective_to)),
            is_active: Set(true),
            rules: Set(input.rules.unwrap_or_else(|| old.rules.clone())),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // The retire and the replacement insert commit together.
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PolicyError::Database(e.to_string()))?;

        let mut retired: policy_rules::ActiveModel = old.into();
        retired.is_active = Set(false);
        retired.updated_at = Set(now);
        retired
            .update(&txn)
            .await
            .map_err(|e| PolicyError::Database(e.to_string()))?;

        let replacement = replacement
            .insert(&txn)
            .await
            .map_err(|e| PolicyError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| PolicyError::Database(e.to_string()))?;

        Ok(replacement)
    }

    /// Lists a tenant's rules for a policy area, newest version first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_rules(
        &self,
        tenant_id: TenantId,
        policy_area: &str,
        include_inactive: bool,
    ) -> Result<Vec<policy_rules::Model>, PolicyError> {
        let mut query = policy_rules::Entity::find()
            .filter(policy_rules::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(policy_rules::Column::PolicyArea.eq(policy_area));

        if !include_inactive {
            query = query.filter(policy_rules::Column::IsActive.eq(true));
        }

        query
            .order_by_desc(policy_rules::Column::Version)
            .order_by_desc(policy_rules::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| PolicyError::Database(e.to_string()))
    }

    async fn fetch_rule(
        &self,
        tenant_id: TenantId,
        rule_id: PolicyRuleId,
    ) -> Result<policy_rules::Model, PolicyError> {
        policy_rules::Entity::find_by_id(rule_id.into_inner())
            .filter(policy_rules::Column::TenantId.eq(tenant_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(|e| PolicyError::Database(e.to_string()))?
            .ok_or(PolicyError::RuleNotFound(rule_id.into_inner()))
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

/// Converts a database rule row to the core resolution type.
fn db_rule_to_core(rule: policy_rules::Model) -> PolicyRule {
    PolicyRule {
        id: rule.id,
        country_code: rule.country_code,
        state_code: rule.state_code,
        policy_area: rule.policy_area,
        entity_type: rule.entity_type,
        action_name: rule.action_name,
        priority: rule.priority,
        version: rule.version,
        effective_from: rule.effective_from,
        effective_to: rule.effective_to,
        is_active: rule.is_active,
        rules: rule.rules,
    }
}
