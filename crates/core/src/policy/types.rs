//! Policy domain types for jurisdiction-aware rule resolution.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A country/state policy rule.
///
/// Rules are matched by jurisdiction (country, optional state), policy
/// area, entity type, and action name, within an effective-date window.
/// Rules are never physically deleted - they are deactivated or
/// superseded by a row with a higher `version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Unique identifier for the rule (also the final tie-breaker).
    pub id: Uuid,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    /// Optional state/region restriction. `None` matches any state.
    pub state_code: Option<String>,
    /// Policy area, e.g. "tax" or "approval".
    pub policy_area: String,
    /// Entity type the rule governs, e.g. "Invoice".
    pub entity_type: String,
    /// Action the rule governs, e.g. "post_invoice".
    pub action_name: String,
    /// Priority for rule selection (higher value wins).
    pub priority: i16,
    /// Version number; superseding a rule creates a higher version.
    pub version: i32,
    /// First day the rule applies (inclusive, None = no lower bound).
    pub effective_from: Option<NaiveDate>,
    /// Last day the rule applies (inclusive, None = no upper bound).
    pub effective_to: Option<NaiveDate>,
    /// Whether the rule participates in resolution.
    pub is_active: bool,
    /// Opaque rules payload, interpreted by the policy-area consumer.
    pub rules: serde_json::Value,
}

impl PolicyRule {
    /// Returns true if the effective window contains `on`.
    #[must_use]
    pub fn effective_on(&self, on: NaiveDate) -> bool {
        let after_start = self.effective_from.is_none_or(|from| from <= on);
        let before_end = self.effective_to.is_none_or(|to| on <= to);
        after_start && before_end
    }
}

/// The lookup key for a policy resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyQuery {
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    /// Optional state/region code for state-specific matching.
    pub state_code: Option<String>,
    /// Policy area, e.g. "tax".
    pub policy_area: String,
    /// Entity type, e.g. "Invoice".
    pub entity_type: String,
    /// Action name, e.g. "post_invoice".
    pub action_name: String,
    /// Instant (date) the policy must be effective on.
    pub effective_on: NaiveDate,
}

/// The outcome of a policy resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether any rule matched the query.
    pub matched: bool,
    /// The winning rule, if any.
    pub rule: Option<PolicyRule>,
}

impl MatchResult {
    /// A result with no matching rule.
    #[must_use]
    pub const fn no_match() -> Self {
        Self {
            matched: false,
            rule: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(from: Option<NaiveDate>, to: Option<NaiveDate>) -> PolicyRule {
        PolicyRule {
            id: Uuid::new_v4(),
            country_code: "AE".to_string(),
            state_code: None,
            policy_area: "tax".to_string(),
            entity_type: "Invoice".to_string(),
            action_name: "post_invoice".to_string(),
            priority: 10,
            version: 1,
            effective_from: from,
            effective_to: to,
            is_active: true,
            rules: json!({}),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_open_ended_window_always_effective() {
        let r = rule(None, None);
        assert!(r.effective_on(date(1990, 1, 1)));
        assert!(r.effective_on(date(2099, 12, 31)));
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let r = rule(Some(date(2026, 2, 1)), Some(date(2026, 2, 10)));
        assert!(r.effective_on(date(2026, 2, 1)));
        assert!(r.effective_on(date(2026, 2, 10)));
        assert!(!r.effective_on(date(2026, 1, 31)));
        assert!(!r.effective_on(date(2026, 2, 11)));
    }

    #[test]
    fn test_no_match_result() {
        let result = MatchResult::no_match();
        assert!(!result.matched);
        assert!(result.rule.is_none());
    }
}
