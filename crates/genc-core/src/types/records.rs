//! # Stored Records
//!
//! Each stored record has a `New*` counterpart carrying every field except
//! the identifier. Creation and full-replacement updates both take the `New*`
//! form; the store assigns identifiers.

use super::{
    AccountId, Designation, FeedbackId, GencId, GencSkillId, Location, MentorDesignation,
    MentorId, ProficiencyLevel, RequirementId, ServiceLineId, SkillId, Status, UserId, UserType,
};
use crate::storage::Record;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// ACCOUNT
// =============================================================================

/// A client account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub account_name: String,
    pub epl_name: String,
    pub edp_name: String,
}

/// Account fields without an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub account_name: String,
    pub epl_name: String,
    pub edp_name: String,
}

impl NewAccount {
    pub(crate) fn into_record(self, id: AccountId) -> Account {
        Account {
            id,
            account_name: self.account_name,
            epl_name: self.epl_name,
            edp_name: self.edp_name,
        }
    }
}

// =============================================================================
// ACCOUNT SERVICE LINE
// =============================================================================

/// A sub-division of a client account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLine {
    pub id: ServiceLineId,
    pub account_id: AccountId,
    pub service_line: String,
    pub edl_name: String,
    pub pdl_name: String,
    pub sl_spoc: String,
}

/// Service line fields without an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewServiceLine {
    pub account_id: AccountId,
    pub service_line: String,
    pub edl_name: String,
    pub pdl_name: String,
    pub sl_spoc: String,
}

impl NewServiceLine {
    pub(crate) fn into_record(self, id: ServiceLineId) -> ServiceLine {
        ServiceLine {
            id,
            account_id: self.account_id,
            service_line: self.service_line,
            edl_name: self.edl_name,
            pdl_name: self.pdl_name,
            sl_spoc: self.sl_spoc,
        }
    }
}

// =============================================================================
// MENTOR
// =============================================================================

/// A staff member assigned to guide GenCs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mentor {
    pub id: MentorId,
    pub associate_id: String,
    pub mentor_name: String,
    pub designation: MentorDesignation,
    pub service_line: String,
}

/// Mentor fields without an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMentor {
    pub associate_id: String,
    pub mentor_name: String,
    pub designation: MentorDesignation,
    pub service_line: String,
}

impl NewMentor {
    pub(crate) fn into_record(self, id: MentorId) -> Mentor {
        Mentor {
            id,
            associate_id: self.associate_id,
            mentor_name: self.mentor_name,
            designation: self.designation,
            service_line: self.service_line,
        }
    }
}

// =============================================================================
// SKILL
// =============================================================================

/// A skill. Matrix matching identifies skills by `skill_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub skill_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// Skill fields without an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSkill {
    pub skill_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewSkill {
    pub(crate) fn into_record(self, id: SkillId) -> Skill {
        Skill {
            id,
            skill_name: self.skill_name,
            description: self.description,
            category: self.category,
        }
    }
}

// =============================================================================
// GENC
// =============================================================================

/// A trainee employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genc {
    pub id: GencId,
    pub associate_id: String,
    pub genc_name: String,
    pub account_id: AccountId,
    pub service_line_id: ServiceLineId,
    pub mentor_id: MentorId,
    pub status: Status,
    pub date_of_joining: NaiveDate,
    pub date_of_allocation: Option<NaiveDate>,
    pub allocation_project: Option<String>,
    pub team_name: Option<String>,
    pub location: Location,
    pub current_designation: Designation,
    pub planned_billing_start_date: Option<NaiveDate>,
    pub actual_billing_start_date: Option<NaiveDate>,
}

/// GenC fields without an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGenc {
    pub associate_id: String,
    pub genc_name: String,
    pub account_id: AccountId,
    pub service_line_id: ServiceLineId,
    pub mentor_id: MentorId,
    pub status: Status,
    pub date_of_joining: NaiveDate,
    #[serde(default)]
    pub date_of_allocation: Option<NaiveDate>,
    #[serde(default)]
    pub allocation_project: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    pub location: Location,
    pub current_designation: Designation,
    #[serde(default)]
    pub planned_billing_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_billing_start_date: Option<NaiveDate>,
}

impl NewGenc {
    pub(crate) fn into_record(self, id: GencId) -> Genc {
        Genc {
            id,
            associate_id: self.associate_id,
            genc_name: self.genc_name,
            account_id: self.account_id,
            service_line_id: self.service_line_id,
            mentor_id: self.mentor_id,
            status: self.status,
            date_of_joining: self.date_of_joining,
            date_of_allocation: self.date_of_allocation,
            allocation_project: self.allocation_project,
            team_name: self.team_name,
            location: self.location,
            current_designation: self.current_designation,
            planned_billing_start_date: self.planned_billing_start_date,
            actual_billing_start_date: self.actual_billing_start_date,
        }
    }
}

impl From<&Genc> for NewGenc {
    fn from(genc: &Genc) -> Self {
        Self {
            associate_id: genc.associate_id.clone(),
            genc_name: genc.genc_name.clone(),
            account_id: genc.account_id,
            service_line_id: genc.service_line_id,
            mentor_id: genc.mentor_id,
            status: genc.status,
            date_of_joining: genc.date_of_joining,
            date_of_allocation: genc.date_of_allocation,
            allocation_project: genc.allocation_project.clone(),
            team_name: genc.team_name.clone(),
            location: genc.location,
            current_designation: genc.current_designation,
            planned_billing_start_date: genc.planned_billing_start_date,
            actual_billing_start_date: genc.actual_billing_start_date,
        }
    }
}

// =============================================================================
// GENC SKILL
// =============================================================================

/// A skill held by a GenC. At most one per (GenC, Skill) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GencSkill {
    pub id: GencSkillId,
    pub genc_id: GencId,
    pub skill_id: SkillId,
    pub proficiency_level: ProficiencyLevel,
    pub date_acquired: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// GenC skill fields without an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGencSkill {
    pub genc_id: GencId,
    pub skill_id: SkillId,
    pub proficiency_level: ProficiencyLevel,
    #[serde(default)]
    pub date_acquired: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewGencSkill {
    pub(crate) fn into_record(self, id: GencSkillId) -> GencSkill {
        GencSkill {
            id,
            genc_id: self.genc_id,
            skill_id: self.skill_id,
            proficiency_level: self.proficiency_level,
            date_acquired: self.date_acquired,
            notes: self.notes,
        }
    }
}

/// Partial update of a GenC skill. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GencSkillPatch {
    #[serde(default)]
    pub proficiency_level: Option<ProficiencyLevel>,
    #[serde(default)]
    pub date_acquired: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl GencSkillPatch {
    pub(crate) fn apply(self, record: &mut GencSkill) {
        if let Some(level) = self.proficiency_level {
            record.proficiency_level = level;
        }
        if let Some(date) = self.date_acquired {
            record.date_acquired = Some(date);
        }
        if let Some(notes) = self.notes {
            record.notes = Some(notes);
        }
    }
}

// =============================================================================
// ROLE SKILL REQUIREMENT
// =============================================================================

/// A skill bar for a role. At most one per (role, Skill) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSkillRequirement {
    pub id: RequirementId,
    pub role: Designation,
    pub skill_id: SkillId,
    pub required_proficiency_level: ProficiencyLevel,
    pub is_mandatory: bool,
}

/// Requirement fields without an identifier.
///
/// `is_mandatory` defaults to `true` and also accepts the legacy
/// `"Yes"`/`"No"` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoleSkillRequirement {
    pub role: Designation,
    pub skill_id: SkillId,
    pub required_proficiency_level: ProficiencyLevel,
    #[serde(default = "mandatory_flag::default", deserialize_with = "mandatory_flag::deserialize")]
    pub is_mandatory: bool,
}

impl NewRoleSkillRequirement {
    pub(crate) fn into_record(self, id: RequirementId) -> RoleSkillRequirement {
        RoleSkillRequirement {
            id,
            role: self.role,
            skill_id: self.skill_id,
            required_proficiency_level: self.required_proficiency_level,
            is_mandatory: self.is_mandatory,
        }
    }
}

pub(crate) mod mandatory_flag {
    use serde::Deserializer;
    use serde::de::{self, Visitor};
    use std::fmt;

    pub fn default() -> bool {
        true
    }

    struct FlagVisitor;

    impl Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean or \"Yes\"/\"No\"")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v.trim().to_ascii_lowercase().as_str() {
                "yes" | "true" => Ok(true),
                "no" | "false" => Ok(false),
                other => Err(E::custom(format!("invalid mandatory flag '{}'", other))),
            }
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(FlagVisitor)
    }
}

// =============================================================================
// GENC FEEDBACK
// =============================================================================

/// Mentor feedback on a GenC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GencFeedback {
    pub id: FeedbackId,
    pub genc_id: GencId,
    pub mentor_id: MentorId,
    pub date_of_feedback: NaiveDate,
    pub feedback: String,
}

/// Feedback fields without an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGencFeedback {
    pub genc_id: GencId,
    pub mentor_id: MentorId,
    pub date_of_feedback: NaiveDate,
    pub feedback: String,
}

impl NewGencFeedback {
    pub(crate) fn into_record(self, id: FeedbackId) -> GencFeedback {
        GencFeedback {
            id,
            genc_id: self.genc_id,
            mentor_id: self.mentor_id,
            date_of_feedback: self.date_of_feedback,
            feedback: self.feedback,
        }
    }
}

// =============================================================================
// APPLICATION USER
// =============================================================================

/// A user of the tracker itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationUser {
    pub id: UserId,
    pub user_assoc_id: String,
    pub user_name: String,
    pub user_type: UserType,
}

/// Application user fields without an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApplicationUser {
    pub user_assoc_id: String,
    pub user_name: String,
    pub user_type: UserType,
}

impl NewApplicationUser {
    pub(crate) fn into_record(self, id: UserId) -> ApplicationUser {
        ApplicationUser {
            id,
            user_assoc_id: self.user_assoc_id,
            user_name: self.user_name,
            user_type: self.user_type,
        }
    }
}

// =============================================================================
// STORAGE BINDINGS
// =============================================================================

macro_rules! bind_record {
    ($record:ty, $table:literal, $kind:literal) => {
        impl Record for $record {
            const TABLE: &'static str = $table;
            const KIND: &'static str = $kind;

            fn key(&self) -> u64 {
                self.id.0
            }
        }
    };
}

bind_record!(Account, "accounts", "Account");
bind_record!(ServiceLine, "account_service_lines", "Account Service Line");
bind_record!(Mentor, "mentors", "Mentor");
bind_record!(Skill, "skills", "Skill");
bind_record!(Genc, "gencs", "GenC");
bind_record!(GencSkill, "genc_skills", "GenC Skill");
bind_record!(RoleSkillRequirement, "role_skill_requirements", "Role Skill Requirement");
bind_record!(GencFeedback, "genc_feedbacks", "GenC Feedback");
bind_record!(ApplicationUser, "application_users", "Application User");
