//! # Core Type Definitions
//!
//! This module contains all core types for the GenC tracker:
//! - Record identifiers (`GencId`, `SkillId`, ...)
//! - Closed enumerations (`Status`, `Designation`, `ProficiencyLevel`, ...)
//! - Stored records and their creation payloads
//! - Paging (`Page`)
//! - Error types (`GencError`)
//!
//! ## Determinism Guarantees
//!
//! All identifiers and enums implement `Ord`, so every collection keyed by
//! them is a `BTreeMap`/`BTreeSet` with a stable iteration order.

mod enums;
mod records;

pub use enums::{Designation, Location, MentorDesignation, ProficiencyLevel, Status, UserType};
pub use records::{
    Account, ApplicationUser, Genc, GencFeedback, GencSkill, GencSkillPatch, Mentor,
    NewAccount, NewApplicationUser, NewGenc, NewGencFeedback, NewGencSkill,
    NewRoleSkillRequirement, NewServiceLine, NewSkill, NewMentor, RoleSkillRequirement,
    ServiceLine, Skill,
};

pub(crate) use records::mandatory_flag;

use crate::primitives::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// RECORD IDENTIFIERS
// =============================================================================

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of an [`Account`].
    AccountId
);
record_id!(
    /// Identifier of a [`ServiceLine`].
    ServiceLineId
);
record_id!(
    /// Identifier of a [`Mentor`].
    MentorId
);
record_id!(
    /// Identifier of a [`Skill`].
    SkillId
);
record_id!(
    /// Identifier of a [`Genc`].
    GencId
);
record_id!(
    /// Identifier of a [`GencSkill`] association.
    GencSkillId
);
record_id!(
    /// Identifier of a [`RoleSkillRequirement`].
    RequirementId
);
record_id!(
    /// Identifier of a [`GencFeedback`] entry.
    FeedbackId
);
record_id!(
    /// Identifier of an [`ApplicationUser`].
    UserId
);

// =============================================================================
// PAGING
// =============================================================================

/// Offset/limit window applied to list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Number of records to skip.
    #[serde(default)]
    pub skip: usize,
    /// Maximum number of records to return (clamped to `MAX_PAGE_LIMIT`).
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Page {
    /// Create a page window.
    #[must_use]
    pub fn new(skip: usize, limit: usize) -> Self {
        Self { skip, limit }
    }

    /// A window wide enough to cover every record.
    #[must_use]
    pub fn all() -> Self {
        Self {
            skip: 0,
            limit: usize::MAX,
        }
    }

    /// Apply the window to an ordered list.
    pub fn apply<T>(self, items: Vec<T>) -> Vec<T> {
        let limit = if self.limit == usize::MAX {
            usize::MAX
        } else {
            self.limit.min(MAX_PAGE_LIMIT)
        };
        items.into_iter().skip(self.skip).take(limit).collect()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the GenC tracker core.
///
/// - No silent failures
/// - Use `Result<T, GencError>` for fallible operations
/// - The core never panics; all errors are recoverable and local to one call
#[derive(Debug, Error)]
pub enum GencError {
    /// The proposed status is not a legal successor of the current one.
    #[error("Invalid status transition from {current} to {requested}")]
    InvalidTransition {
        /// Status currently stored.
        current: Status,
        /// Status the caller asked for.
        requested: Status,
    },

    /// A lookup by identity found nothing.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Record kind, e.g. "GenC".
        entity: &'static str,
        /// The identity that was looked up.
        key: String,
    },

    /// A unique natural key is already taken.
    #[error("{entity} {key} already registered")]
    AlreadyExists {
        /// Record kind, e.g. "Skill".
        entity: &'static str,
        /// The conflicting key.
        key: String,
    },

    /// A record cannot be deleted while other records point at it.
    #[error("{entity} {key} is still referenced by {referrers}")]
    InUse {
        /// Record kind being deleted.
        entity: &'static str,
        /// Identity of that record.
        key: String,
        /// What still refers to it, e.g. "3 GenC(s)".
        referrers: String,
    },

    /// A field failed validation.
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        /// Field (or type) name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O or storage error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl GencError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Shorthand for an `AlreadyExists` error.
    pub fn already_exists(entity: &'static str, key: impl ToString) -> Self {
        Self::AlreadyExists {
            entity,
            key: key.to_string(),
        }
    }

    /// Shorthand for an `InvalidField` error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_default_window() {
        let items: Vec<u32> = (0..250).collect();
        let page = Page::default().apply(items);
        assert_eq!(page.len(), DEFAULT_PAGE_LIMIT);
        assert_eq!(page.first(), Some(&0));
    }

    #[test]
    fn page_skip_and_limit() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(Page::new(8, 5).apply(items.clone()), vec![8, 9]);
        assert!(Page::new(20, 5).apply(items).is_empty());
    }

    #[test]
    fn page_limit_is_clamped() {
        let items: Vec<usize> = (0..MAX_PAGE_LIMIT + 50).collect();
        assert_eq!(Page::new(0, usize::MAX - 1).apply(items).len(), MAX_PAGE_LIMIT);
    }

    #[test]
    fn invalid_transition_message_names_both_states() {
        let err = GencError::InvalidTransition {
            current: Status::Idle,
            requested: Status::BillingStarted,
        };
        assert_eq!(
            err.to_string(),
            "Invalid status transition from Idle to Billing Started"
        );
    }

    #[test]
    fn id_display_is_bare_number() {
        assert_eq!(GencId(42).to_string(), "42");
    }
}
