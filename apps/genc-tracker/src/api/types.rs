//! # API Request/Response Types
//!
//! JSON structures specific to the HTTP surface. Record payloads reuse the
//! core `New*` types directly.

use genc_core::{
    GencError, MatrixSummary, Page, RecordCounts, Status,
    primitives::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Tracker status: record counts, GenCs per status and matrix totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub backend: String,
    pub counts: RecordCounts,
    /// Keyed by status label.
    pub gencs_by_status: BTreeMap<String, usize>,
    pub matrix: MatrixSummary,
}

impl StatusResponse {
    /// Re-key status counts by label for the wire.
    #[must_use]
    pub fn label_counts(counts: BTreeMap<Status, usize>) -> BTreeMap<String, usize> {
        counts
            .into_iter()
            .map(|(status, n)| (status.label().to_string(), n))
            .collect()
    }
}

// =============================================================================
// PAGING & FILTERS
// =============================================================================

/// `?skip=&limit=` query parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

impl PageQuery {
    /// Convert to a core page, rejecting limits above `MAX_PAGE_LIMIT`.
    pub fn to_page(self) -> Result<Page, GencError> {
        if self.limit > MAX_PAGE_LIMIT {
            return Err(GencError::invalid(
                "limit",
                format!("must be at most {MAX_PAGE_LIMIT}"),
            ));
        }
        Ok(Page::new(self.skip, self.limit))
    }
}

/// `?gaps_only=` on the skill matrix.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MatrixQuery {
    #[serde(default)]
    pub gaps_only: bool,
}

// =============================================================================
// STATUS CHANGES
// =============================================================================

/// Body of `POST /gencs/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    pub status: Status,
}

/// Body of `POST /status-transitions/check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionCheckRequest {
    pub current: Status,
    pub proposed: Status,
}

/// Verdict for a transition check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionCheckResponse {
    pub current: Status,
    pub proposed: Status,
    pub allowed: bool,
    /// Every status that may follow `current`, itself included.
    pub allowed_next: Vec<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

// =============================================================================
// MESSAGES
// =============================================================================

/// Plain acknowledgement, e.g. after a delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn deleted(kind: &str) -> Self {
        Self {
            message: format!("{kind} deleted successfully"),
        }
    }
}
