//! # Input Validation
//!
//! Field checks run on every creation and replacement payload before the
//! store is touched. A payload either passes as a whole or is rejected with
//! the first offending field.

use crate::GencError;
use crate::primitives::{
    MAX_ASSOCIATE_ID_LENGTH, MAX_CATEGORY_LENGTH, MAX_NAME_LENGTH, MAX_TEXT_LENGTH,
};
use crate::types::{
    NewAccount, NewApplicationUser, NewGenc, NewGencFeedback, NewGencSkill, NewMentor,
    NewRoleSkillRequirement, NewServiceLine, NewSkill,
};

/// A payload that can check its own fields.
pub trait Validate {
    fn validate(&self) -> Result<(), GencError>;
}

fn required(field: &'static str, value: &str, max: usize) -> Result<(), GencError> {
    if value.trim().is_empty() {
        return Err(GencError::invalid(field, "must not be empty"));
    }
    bounded(field, value, max)
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<(), GencError> {
    if value.len() > max {
        return Err(GencError::invalid(
            field,
            format!("exceeds {max} bytes ({} given)", value.len()),
        ));
    }
    if value.chars().any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t') {
        return Err(GencError::invalid(field, "contains control characters"));
    }
    Ok(())
}

fn optional(field: &'static str, value: Option<&str>, max: usize) -> Result<(), GencError> {
    value.map_or(Ok(()), |v| bounded(field, v, max))
}

fn associate_id(field: &'static str, value: &str) -> Result<(), GencError> {
    required(field, value, MAX_ASSOCIATE_ID_LENGTH)?;
    if value.chars().any(char::is_whitespace) {
        return Err(GencError::invalid(field, "must not contain whitespace"));
    }
    Ok(())
}

impl Validate for NewAccount {
    fn validate(&self) -> Result<(), GencError> {
        required("account_name", &self.account_name, MAX_NAME_LENGTH)?;
        required("epl_name", &self.epl_name, MAX_NAME_LENGTH)?;
        required("edp_name", &self.edp_name, MAX_NAME_LENGTH)
    }
}

impl Validate for NewServiceLine {
    fn validate(&self) -> Result<(), GencError> {
        required("service_line", &self.service_line, MAX_NAME_LENGTH)?;
        required("edl_name", &self.edl_name, MAX_NAME_LENGTH)?;
        required("pdl_name", &self.pdl_name, MAX_NAME_LENGTH)?;
        required("sl_spoc", &self.sl_spoc, MAX_NAME_LENGTH)
    }
}

impl Validate for NewMentor {
    fn validate(&self) -> Result<(), GencError> {
        associate_id("associate_id", &self.associate_id)?;
        required("mentor_name", &self.mentor_name, MAX_NAME_LENGTH)?;
        required("service_line", &self.service_line, MAX_NAME_LENGTH)
    }
}

impl Validate for NewSkill {
    fn validate(&self) -> Result<(), GencError> {
        required("skill_name", &self.skill_name, MAX_NAME_LENGTH)?;
        optional("description", self.description.as_deref(), MAX_TEXT_LENGTH)?;
        optional("category", self.category.as_deref(), MAX_CATEGORY_LENGTH)
    }
}

impl Validate for NewGenc {
    fn validate(&self) -> Result<(), GencError> {
        associate_id("associate_id", &self.associate_id)?;
        required("genc_name", &self.genc_name, MAX_NAME_LENGTH)?;
        optional(
            "allocation_project",
            self.allocation_project.as_deref(),
            MAX_NAME_LENGTH,
        )?;
        optional("team_name", self.team_name.as_deref(), MAX_NAME_LENGTH)
    }
}

impl Validate for NewGencSkill {
    fn validate(&self) -> Result<(), GencError> {
        optional("notes", self.notes.as_deref(), MAX_TEXT_LENGTH)
    }
}

// Enums and an id only. The skill reference is checked by the tracker.
impl Validate for NewRoleSkillRequirement {
    fn validate(&self) -> Result<(), GencError> {
        Ok(())
    }
}

impl Validate for NewGencFeedback {
    fn validate(&self) -> Result<(), GencError> {
        required("feedback", &self.feedback, MAX_TEXT_LENGTH)
    }
}

impl Validate for NewApplicationUser {
    fn validate(&self) -> Result<(), GencError> {
        associate_id("user_assoc_id", &self.user_assoc_id)?;
        required("user_name", &self.user_name, MAX_NAME_LENGTH)
    }
}
