//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `WorkflowTaskId` where a
//! `WorkflowInstanceId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(TenantId, "Unique identifier for a tenant organization.");
typed_id!(PolicyRuleId, "Unique identifier for a country/state policy rule.");
typed_id!(OutboxEventId, "Unique identifier for an outbox event.");
typed_id!(
    WorkflowDefinitionId,
    "Unique identifier for a workflow definition."
);
typed_id!(
    WorkflowInstanceId,
    "Unique identifier for a workflow instance."
);
typed_id!(WorkflowTaskId, "Unique identifier for a workflow task.");
typed_id!(
    LedgerEntryId,
    "Unique identifier for a multi-currency ledger entry."
);
typed_id!(DocumentId, "Unique identifier for a managed document.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(TenantId::new(), TenantId::new());
        assert_ne!(OutboxEventId::new(), OutboxEventId::new());
    }

    #[test]
    fn test_roundtrip_from_str() {
        let id = WorkflowInstanceId::new();
        let parsed = WorkflowInstanceId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_from_uuid_preserves_value() {
        let raw = Uuid::new_v4();
        assert_eq!(PolicyRuleId::from_uuid(raw).into_inner(), raw);
    }
}
