//! Deterministic policy rule resolution.
//!
//! The resolver is a pure function over a loaded rule slice: it never
//! touches storage and returns the same result for the same inputs.

use std::cmp::Ordering;

use crate::policy::error::PolicyError;
use crate::policy::types::{MatchResult, PolicyQuery, PolicyRule};

/// Stateless engine for resolving the applicable policy rule.
pub struct PolicyResolver;

impl PolicyResolver {
    /// Resolve the winning policy rule for a query.
    ///
    /// Matching: active rules with the query's country, an exactly
    /// matching state or no state restriction, exact policy area /
    /// entity type / action name, and an effective window containing
    /// `effective_on` (open bounds treated as unbounded).
    ///
    /// Ranking: a state-specific match outranks a wildcard-state match,
    /// then the highest `priority` value wins, and remaining ties go to
    /// the lowest rule id. The order is total, so resolution is
    /// deterministic and reproducible for identical inputs.
    ///
    /// # Errors
    ///
    /// * `PolicyError::Validation` if a required query field is empty
    /// * `PolicyError::MalformedPayload` if the winning rule's stored
    ///   payload is not a JSON object - surfaced, never defaulted to
    ///   "no policy"
    pub fn resolve(rules: &[PolicyRule], query: &PolicyQuery) -> Result<MatchResult, PolicyError> {
        validate_query(query)?;

        let mut survivors: Vec<&PolicyRule> = rules
            .iter()
            .filter(|r| r.is_active)
            .filter(|r| r.country_code == query.country_code)
            .filter(|r| match &r.state_code {
                None => true,
                Some(state) => query.state_code.as_deref() == Some(state.as_str()),
            })
            .filter(|r| {
                r.policy_area == query.policy_area
                    && r.entity_type == query.entity_type
                    && r.action_name == query.action_name
            })
            .filter(|r| r.effective_on(query.effective_on))
            .collect();

        survivors.sort_by(|a, b| rank(a, b));

        let Some(winner) = survivors.first() else {
            return Ok(MatchResult::no_match());
        };

        if !winner.rules.is_object() {
            return Err(PolicyError::MalformedPayload {
                rule_id: winner.id,
                detail: "rules payload must be a JSON object".to_string(),
            });
        }

        Ok(MatchResult {
            matched: true,
            rule: Some((*winner).clone()),
        })
    }
}

/// Total order: state-specific first, then priority descending, then id
/// ascending.
fn rank(a: &PolicyRule, b: &PolicyRule) -> Ordering {
    let a_specific = a.state_code.is_some();
    let b_specific = b.state_code.is_some();
    b_specific
        .cmp(&a_specific)
        .then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| a.id.cmp(&b.id))
}

fn validate_query(query: &PolicyQuery) -> Result<(), PolicyError> {
    for (field, value) in [
        ("country_code", &query.country_code),
        ("policy_area", &query.policy_area),
        ("entity_type", &query.entity_type),
        ("action_name", &query.action_name),
    ] {
        if value.trim().is_empty() {
            return Err(PolicyError::Validation(format!("{field} is required")));
        }
    }
    Ok(())
}
