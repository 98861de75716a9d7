//! Serialization tests for the API request/response types.

#![allow(clippy::unwrap_used, clippy::panic)]

use genc_core::{GencError, Status};
use genc_tracker::api::{
    ApiError, ErrorResponse, HealthResponse, MatrixQuery, MessageResponse, PageQuery,
    StatusChangeRequest, StatusResponse, TransitionCheckRequest, TransitionCheckResponse,
};
use axum::http::StatusCode;
use std::collections::BTreeMap;

// =============================================================================
// HEALTH & STATUS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_status_counts_keyed_by_label() {
    let mut counts = BTreeMap::new();
    counts.insert(Status::Idle, 3);
    counts.insert(Status::ReleasedResigned, 1);

    let labelled = StatusResponse::label_counts(counts);

    assert_eq!(labelled["Idle"], 3);
    assert_eq!(labelled["Released/Resigned"], 1);
}

// =============================================================================
// QUERIES
// =============================================================================

#[test]
fn test_page_query_defaults() {
    let query: PageQuery = serde_json::from_str("{}").unwrap();
    let page = query.to_page().unwrap();
    assert_eq!(page.skip, 0);
    assert_eq!(page.limit, 100);
}

#[test]
fn test_page_query_limit_bound() {
    let at_max = PageQuery { skip: 0, limit: 1000 };
    assert!(at_max.to_page().is_ok());

    let over = PageQuery { skip: 0, limit: 1001 };
    assert!(matches!(
        over.to_page(),
        Err(GencError::InvalidField { field: "limit", .. })
    ));
}

#[test]
fn test_matrix_query_defaults_to_all() {
    let query: MatrixQuery = serde_json::from_str("{}").unwrap();
    assert!(!query.gaps_only);
}

// =============================================================================
// LIFECYCLE PAYLOADS
// =============================================================================

#[test]
fn test_status_change_accepts_labels_only() {
    let req: StatusChangeRequest =
        serde_json::from_str(r#"{"status":"Under Project Training"}"#).unwrap();
    assert_eq!(req.status, Status::UnderProjectTraining);

    assert!(serde_json::from_str::<StatusChangeRequest>(r#"{"status":"Unknown"}"#).is_err());
}

#[test]
fn test_transition_check_request_deserialization() {
    let req: TransitionCheckRequest =
        serde_json::from_str(r#"{"current":"Billing Started","proposed":"GenC Regularized"}"#)
            .unwrap();
    assert_eq!(req.current, Status::BillingStarted);
    assert_eq!(req.proposed, Status::GencRegularized);
}

#[test]
fn test_transition_check_response_omits_empty_detail() {
    let response = TransitionCheckResponse {
        current: Status::Idle,
        proposed: Status::Idle,
        allowed: true,
        allowed_next: vec![Status::Idle],
        detail: None,
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(!json.contains("detail"));
    assert!(json.contains("\"allowed_next\":[\"Idle\"]"));
}

// =============================================================================
// ERRORS & MESSAGES
// =============================================================================

#[test]
fn test_error_status_mapping() {
    let cases = [
        (
            GencError::InvalidTransition {
                current: Status::Idle,
                requested: Status::BillingStarted,
            },
            StatusCode::BAD_REQUEST,
        ),
        (GencError::not_found("GenC", 7), StatusCode::NOT_FOUND),
        (GencError::already_exists("Skill", "Rust"), StatusCode::BAD_REQUEST),
        (GencError::invalid("genc_name", "must not be empty"), StatusCode::BAD_REQUEST),
        (
            GencError::InUse {
                entity: "Mentor",
                key: "1".to_string(),
                referrers: "2 GenC(s)".to_string(),
            },
            StatusCode::CONFLICT,
        ),
        (GencError::IoError("disk".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (err, expected) in cases {
        assert_eq!(ApiError::from(err).status(), expected);
    }
}

#[test]
fn test_error_response_shape() {
    let body = ErrorResponse {
        detail: "GenC not found: 7".to_string(),
    };
    assert_eq!(
        serde_json::to_string(&body).unwrap(),
        r#"{"detail":"GenC not found: 7"}"#
    );
}

#[test]
fn test_deleted_message() {
    assert_eq!(
        MessageResponse::deleted("Skill").message,
        "Skill deleted successfully"
    );
}
