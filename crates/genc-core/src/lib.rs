//! # genc-core
//!
//! The deterministic record engine for the GenC tracker.
//!
//! This crate owns the two pieces of business logic the tracker exists for:
//! - the **status lifecycle** (`lifecycle`): which status changes a GenC may
//!   undergo, enforced before any write;
//! - the **skill gap matrix** (`matrix`): each GenC's held skills judged
//!   against the requirements of their current role.
//!
//! Around them sit the record model (`types`), field validation
//! (`validation`), storage backends (`storage`), the `Tracker` that ties
//! them together, and bundle import (`seed`).
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - `BTreeMap`/`BTreeSet` only, so every listing is reproducible
//! - Reports are recomputed per call and never stored

// =============================================================================
// MODULES
// =============================================================================

pub mod lifecycle;
pub mod matrix;
pub mod primitives;
pub mod seed;
pub mod storage;
pub mod tracker;
pub mod types;
pub mod validation;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Account, AccountId, ApplicationUser, Designation, FeedbackId, GencError, Genc, GencFeedback,
    GencId, GencSkill, GencSkillId, GencSkillPatch, Location, Mentor, MentorDesignation, MentorId,
    NewAccount, NewApplicationUser, NewGenc, NewGencFeedback, NewGencSkill, NewMentor,
    NewRoleSkillRequirement, NewServiceLine, NewSkill, Page, ProficiencyLevel, RequirementId,
    RoleSkillRequirement, ServiceLine, ServiceLineId, Skill, SkillId, Status, UserId, UserType,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use lifecycle::{
    allowed_successors, is_terminal, is_transition_allowed, transition_table, validate_transition,
};
pub use matrix::{
    GencProfile, GencSkillReport, HeldSkill, MatrixSummary, MissingSkill, RequirementEntry,
    RequirementIndex, RoleRequirementLine, RoleRequirements, SkillStanding,
    build_role_requirements_matrix, build_skill_matrix, summarize,
};
pub use seed::{ImportReport, SeedBundle};
pub use storage::{MemoryStore, RecordStore, RedbStore};
pub use tracker::{RecordCounts, StorageBackend, Tracker};
