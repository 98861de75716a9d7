//! # Status Lifecycle
//!
//! The fixed state machine governing GenC status changes.
//!
//! | Current | Allowed next states |
//! |---|---|
//! | Idle | Under Project Training, Customer Onboarded, Released/Resigned |
//! | Under Project Training | Customer Onboarded, Feedback Not Good, Released/Resigned |
//! | Customer Onboarded | Billing Planned, Feedback Not Good, Released/Resigned |
//! | Billing Planned | Feedback Not Good, Billing Started, Released/Resigned |
//! | Billing Started | GenC Regularized, Released/Resigned |
//! | Feedback Not Good | terminal |
//! | GenC Regularized | terminal |
//! | Released/Resigned | terminal |
//!
//! Re-saving the current status is always legal. The table is compiled into
//! the binary and cannot change at runtime.

use crate::{GencError, Status};
use std::collections::BTreeMap;

use Status::{
    BillingPlanned, BillingStarted, CustomerOnboarded, FeedbackNotGood, GencRegularized, Idle,
    ReleasedResigned, UnderProjectTraining,
};

/// Legal successors of `current`, excluding `current` itself.
///
/// Terminal statuses return an empty slice.
#[must_use]
pub const fn allowed_successors(current: Status) -> &'static [Status] {
    match current {
        Idle => &[UnderProjectTraining, CustomerOnboarded, ReleasedResigned],
        UnderProjectTraining => &[CustomerOnboarded, FeedbackNotGood, ReleasedResigned],
        CustomerOnboarded => &[BillingPlanned, FeedbackNotGood, ReleasedResigned],
        BillingPlanned => &[FeedbackNotGood, BillingStarted, ReleasedResigned],
        BillingStarted => &[GencRegularized, ReleasedResigned],
        FeedbackNotGood | GencRegularized | ReleasedResigned => &[],
    }
}

/// True if a GenC in `current` may be saved with `proposed`.
#[must_use]
pub fn is_transition_allowed(current: Status, proposed: Status) -> bool {
    current == proposed || allowed_successors(current).contains(&proposed)
}

/// Gate a status change.
///
/// Returns `GencError::InvalidTransition` naming both statuses when the move
/// is not in the table.
pub fn validate_transition(current: Status, proposed: Status) -> Result<(), GencError> {
    if is_transition_allowed(current, proposed) {
        Ok(())
    } else {
        Err(GencError::InvalidTransition {
            current,
            requested: proposed,
        })
    }
}

/// True if no status other than itself may follow `status`.
#[must_use]
pub const fn is_terminal(status: Status) -> bool {
    allowed_successors(status).is_empty()
}

/// The whole table, keyed by current status, for reference listings.
#[must_use]
pub fn transition_table() -> BTreeMap<Status, &'static [Status]> {
    Status::ALL
        .iter()
        .map(|&status| (status, allowed_successors(status)))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
