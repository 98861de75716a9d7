//! # Record Handlers
//!
//! Create/read/update/delete for every stored record, plus the lookups that
//! hang off them (`/gencs/{id}/skills`, `/skills/by-name/{name}`, ...).
//!
//! Creates answer `201 Created` with the stored record. Deletes answer with
//! a `{ "message": ... }` acknowledgement.

use super::{
    AppState,
    error::ApiResult,
    types::{MessageResponse, PageQuery},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use genc_core::{
    Account, AccountId, ApplicationUser, Designation, FeedbackId, Genc, GencError, GencFeedback,
    GencId, GencSkill, GencSkillId, GencSkillPatch, Mentor, MentorId, NewAccount,
    NewApplicationUser, NewGenc, NewGencFeedback, NewGencSkill, NewMentor,
    NewRoleSkillRequirement, NewServiceLine, NewSkill, RequirementId, RoleSkillRequirement,
    ServiceLine, ServiceLineId, Skill, SkillId, Status, UserId,
};

/// Generates the five standard handlers for one record kind inside a module
/// named after it.
macro_rules! crud_handlers {
    (
        $module:ident, $kind:literal, $id:ident, $new:ty => $record:ty,
        create: $create:ident, get: $get:ident, list: $list:ident,
        update: $update:ident($update_body:ty), delete: $delete:ident $(,)?
    ) => {
        pub mod $module {
            use super::*;

            pub async fn create(
                State(state): State<AppState>,
                Json(new): Json<$new>,
            ) -> ApiResult<(StatusCode, Json<$record>)> {
                let record = state.tracker.write().await.$create(new)?;
                tracing::info!(kind = $kind, id = %record.id, "Record created");
                Ok((StatusCode::CREATED, Json(record)))
            }

            pub async fn get(
                State(state): State<AppState>,
                Path(id): Path<u64>,
            ) -> ApiResult<Json<$record>> {
                Ok(Json(state.tracker.read().await.$get($id(id))?))
            }

            pub async fn list(
                State(state): State<AppState>,
                Query(query): Query<PageQuery>,
            ) -> ApiResult<Json<Vec<$record>>> {
                let page = query.to_page()?;
                Ok(Json(state.tracker.read().await.$list(page)?))
            }

            pub async fn update(
                State(state): State<AppState>,
                Path(id): Path<u64>,
                Json(body): Json<$update_body>,
            ) -> ApiResult<Json<$record>> {
                let record = state.tracker.write().await.$update($id(id), body)?;
                tracing::info!(kind = $kind, id = %record.id, "Record updated");
                Ok(Json(record))
            }

            pub async fn delete(
                State(state): State<AppState>,
                Path(id): Path<u64>,
            ) -> ApiResult<Json<MessageResponse>> {
                state.tracker.write().await.$delete($id(id))?;
                tracing::info!(kind = $kind, id, "Record deleted");
                Ok(Json(MessageResponse::deleted($kind)))
            }
        }
    };
}

crud_handlers!(
    accounts, "Account", AccountId, NewAccount => Account,
    create: create_account, get: account, list: accounts,
    update: update_account(NewAccount), delete: delete_account,
);

crud_handlers!(
    service_lines, "Account Service Line", ServiceLineId, NewServiceLine => ServiceLine,
    create: create_service_line, get: service_line, list: service_lines,
    update: update_service_line(NewServiceLine), delete: delete_service_line,
);

crud_handlers!(
    mentors, "Mentor", MentorId, NewMentor => Mentor,
    create: create_mentor, get: mentor, list: mentors,
    update: update_mentor(NewMentor), delete: delete_mentor,
);

crud_handlers!(
    skills, "Skill", SkillId, NewSkill => Skill,
    create: create_skill, get: skill, list: skills,
    update: update_skill(NewSkill), delete: delete_skill,
);

crud_handlers!(
    gencs, "GenC", GencId, NewGenc => Genc,
    create: create_genc, get: genc, list: gencs,
    update: update_genc(NewGenc), delete: delete_genc,
);

// Creating an existing (GenC, skill) pair updates it in place.
crud_handlers!(
    genc_skills, "GenC Skill", GencSkillId, NewGencSkill => GencSkill,
    create: add_genc_skill, get: genc_skill, list: genc_skills,
    update: update_genc_skill(GencSkillPatch), delete: delete_genc_skill,
);

// Same for (role, skill).
crud_handlers!(
    requirements, "Role Skill Requirement", RequirementId,
    NewRoleSkillRequirement => RoleSkillRequirement,
    create: set_role_requirement, get: role_requirement, list: role_requirements,
    update: update_role_requirement(NewRoleSkillRequirement), delete: delete_role_requirement,
);

crud_handlers!(
    feedbacks, "GenC Feedback", FeedbackId, NewGencFeedback => GencFeedback,
    create: create_feedback, get: feedback, list: feedbacks,
    update: update_feedback(NewGencFeedback), delete: delete_feedback,
);

crud_handlers!(
    users, "Application User", UserId, NewApplicationUser => ApplicationUser,
    create: create_user, get: user, list: users,
    update: update_user(NewApplicationUser), delete: delete_user,
);

// =============================================================================
// LOOKUPS
// =============================================================================

/// Turn an optional natural-key lookup into a 404.
fn found<T>(entity: &'static str, key: &str, record: Option<T>) -> ApiResult<Json<T>> {
    record
        .map(Json)
        .ok_or_else(|| GencError::not_found(entity, key).into())
}

pub async fn account_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Account>> {
    let account = state.tracker.read().await.account_by_name(&name)?;
    found("Account", &name, account)
}

pub async fn service_lines_for_account(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Vec<ServiceLine>>> {
    Ok(Json(
        state
            .tracker
            .read()
            .await
            .service_lines_for_account(AccountId(id))?,
    ))
}

pub async fn mentor_by_associate_id(
    State(state): State<AppState>,
    Path(associate_id): Path<String>,
) -> ApiResult<Json<Mentor>> {
    let mentor = state
        .tracker
        .read()
        .await
        .mentor_by_associate_id(&associate_id)?;
    found("Mentor", &associate_id, mentor)
}

pub async fn skill_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Skill>> {
    let skill = state.tracker.read().await.skill_by_name(&name)?;
    found("Skill", &name, skill)
}

pub async fn skills_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<Skill>>> {
    Ok(Json(
        state.tracker.read().await.skills_by_category(&category)?,
    ))
}

pub async fn gencs_with_skill(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Vec<GencSkill>>> {
    Ok(Json(state.tracker.read().await.gencs_with_skill(SkillId(id))?))
}

pub async fn genc_by_associate_id(
    State(state): State<AppState>,
    Path(associate_id): Path<String>,
) -> ApiResult<Json<Genc>> {
    let genc = state
        .tracker
        .read()
        .await
        .genc_by_associate_id(&associate_id)?;
    found("GenC", &associate_id, genc)
}

/// `status` may be given as label or key (`Billing Started`, `BILLING_STARTED`).
pub async fn gencs_with_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> ApiResult<Json<Vec<Genc>>> {
    let status: Status = status.parse()?;
    Ok(Json(state.tracker.read().await.gencs_with_status(status)?))
}

pub async fn skills_for_genc(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Vec<GencSkill>>> {
    Ok(Json(state.tracker.read().await.skills_for_genc(GencId(id))?))
}

pub async fn feedback_for_genc(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Vec<GencFeedback>>> {
    Ok(Json(state.tracker.read().await.feedback_for_genc(GencId(id))?))
}

pub async fn requirements_for_role(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> ApiResult<Json<Vec<RoleSkillRequirement>>> {
    let role: Designation = role.parse()?;
    Ok(Json(state.tracker.read().await.requirements_for_role(role)?))
}

pub async fn user_by_assoc_id(
    State(state): State<AppState>,
    Path(assoc_id): Path<String>,
) -> ApiResult<Json<ApplicationUser>> {
    let user = state.tracker.read().await.user_by_assoc_id(&assoc_id)?;
    found("Application User", &assoc_id, user)
}
