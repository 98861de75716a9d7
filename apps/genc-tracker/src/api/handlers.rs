//! # API Endpoint Handlers
//!
//! Reporting, reference data and the status lifecycle. Record CRUD lives in
//! `records`.

use super::{
    AppState,
    error::ApiResult,
    types::{
        HealthResponse, MatrixQuery, StatusChangeRequest, StatusResponse, TransitionCheckRequest,
        TransitionCheckResponse,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use genc_core::{
    Designation, Genc, GencId, GencSkillReport, Location, MentorDesignation, ProficiencyLevel,
    RoleRequirements, Status, UserType, allowed_successors, is_transition_allowed, summarize,
    transition_table, validate_transition,
};
use serde_json::{Map, Value};

// =============================================================================
// HEALTH & STATUS
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Record counts, GenCs per status and matrix totals.
pub async fn status_handler(State(state): State<AppState>) -> ApiResult<Json<StatusResponse>> {
    let tracker = state.tracker.read().await;
    let reports = tracker.skill_matrix()?;

    Ok(Json(StatusResponse {
        backend: tracker.backend_name().to_string(),
        counts: tracker.counts()?,
        gencs_by_status: StatusResponse::label_counts(tracker.status_counts()?),
        matrix: summarize(&reports),
    }))
}

// =============================================================================
// MATRICES
// =============================================================================

/// Per-GenC skill gap report. `?gaps_only=true` drops compliant GenCs.
pub async fn skill_matrix_handler(
    State(state): State<AppState>,
    Query(query): Query<MatrixQuery>,
) -> ApiResult<Json<Vec<GencSkillReport>>> {
    let mut reports = state.tracker.read().await.skill_matrix()?;
    if query.gaps_only {
        reports.retain(|r| !r.is_compliant());
    }
    Ok(Json(reports))
}

/// Requirements grouped by role.
pub async fn role_requirements_matrix_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RoleRequirements>>> {
    Ok(Json(state.tracker.read().await.role_requirements_matrix()?))
}

// =============================================================================
// REFERENCE DATA
// =============================================================================

/// `{ KEY: label }` in declaration order.
fn enum_map<E: Copy>(
    all: &[E],
    key: fn(E) -> &'static str,
    label: fn(E) -> &'static str,
) -> Json<Map<String, Value>> {
    Json(
        all.iter()
            .map(|&v| (key(v).to_string(), Value::from(label(v))))
            .collect(),
    )
}

pub async fn status_enum_handler() -> Json<Map<String, Value>> {
    enum_map(Status::ALL, Status::key, Status::label)
}

pub async fn location_enum_handler() -> Json<Map<String, Value>> {
    enum_map(Location::ALL, Location::key, Location::label)
}

pub async fn designation_enum_handler() -> Json<Map<String, Value>> {
    enum_map(Designation::ALL, Designation::key, Designation::label)
}

pub async fn mentor_designation_enum_handler() -> Json<Map<String, Value>> {
    enum_map(
        MentorDesignation::ALL,
        MentorDesignation::key,
        MentorDesignation::label,
    )
}

pub async fn user_type_enum_handler() -> Json<Map<String, Value>> {
    enum_map(UserType::ALL, UserType::key, UserType::label)
}

pub async fn proficiency_level_enum_handler() -> Json<Map<String, Value>> {
    enum_map(
        ProficiencyLevel::ALL,
        ProficiencyLevel::key,
        ProficiencyLevel::label,
    )
}

/// The lifecycle table as `{ label: [labels] }`. Terminal statuses map to
/// an empty list.
pub async fn status_transitions_handler() -> Json<Map<String, Value>> {
    let table = transition_table()
        .into_iter()
        .map(|(status, next)| {
            let labels = next.iter().map(|s| Value::from(s.label())).collect();
            (status.label().to_string(), Value::Array(labels))
        })
        .collect();
    Json(table)
}

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Dry-run a status change without touching any record.
pub async fn check_transition_handler(
    Json(request): Json<TransitionCheckRequest>,
) -> Json<TransitionCheckResponse> {
    let TransitionCheckRequest { current, proposed } = request;
    let allowed_next = std::iter::once(current)
        .chain(allowed_successors(current).iter().copied())
        .collect();

    Json(TransitionCheckResponse {
        current,
        proposed,
        allowed: is_transition_allowed(current, proposed),
        allowed_next,
        detail: validate_transition(current, proposed)
            .err()
            .map(|e| e.to_string()),
    })
}

/// Move a GenC to a new status, enforcing the lifecycle.
pub async fn change_status_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<StatusChangeRequest>,
) -> ApiResult<Json<Genc>> {
    let mut tracker = state.tracker.write().await;
    let genc = tracker.transition_status(GencId(id), request.status)?;
    tracing::info!(
        genc = %genc.associate_id,
        status = %genc.status,
        "GenC status changed"
    );
    Ok(Json(genc))
}
