//! # Seed Import
//!
//! Bulk-load a JSON bundle of reference data and GenCs.
//!
//! Records in a bundle point at each other by natural key (account name,
//! mentor associate id, skill name, GenC associate id) rather than by
//! identifier, so a bundle can be written by hand or exported from another
//! system. Kinds are loaded in dependency order. Stored natural keys are
//! read once up front; records whose key is already present are skipped,
//! which makes re-importing a bundle a no-op. Feedback entries are matched
//! on GenC, mentor, date and text.
//!
//! Import is not a single transaction: a failure part-way leaves the records
//! loaded before it in place, and the error names the offending record.

use crate::primitives::MAX_IMPORT_RECORDS;
use crate::types::{
    Account, AccountId, ApplicationUser, Designation, Genc, GencFeedback, GencId, Location,
    Mentor, MentorId, NewAccount, NewApplicationUser, NewGenc, NewGencFeedback, NewGencSkill,
    NewMentor, NewRoleSkillRequirement, NewServiceLine, NewSkill, ProficiencyLevel,
    ServiceLine, ServiceLineId, Skill, SkillId, Status,
};
use crate::{GencError, Tracker};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// BUNDLE FORMAT
// =============================================================================

/// A service line, attached to its account by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedServiceLine {
    pub account_name: String,
    pub service_line: String,
    pub edl_name: String,
    pub pdl_name: String,
    pub sl_spoc: String,
}

/// A GenC, attached to account, service line and mentor by natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedGenc {
    pub associate_id: String,
    pub genc_name: String,
    pub account_name: String,
    pub service_line: String,
    pub mentor_associate_id: String,
    #[serde(default)]
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

/// A held skill, by GenC associate id and skill name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedGencSkill {
    pub genc_associate_id: String,
    pub skill_name: String,
    pub proficiency_level: ProficiencyLevel,
    #[serde(default)]
    pub date_acquired: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A role requirement, by skill name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRequirement {
    pub role: Designation,
    pub skill_name: String,
    pub required_proficiency_level: ProficiencyLevel,
    #[serde(
        default = "crate::types::mandatory_flag::default",
        deserialize_with = "crate::types::mandatory_flag::deserialize"
    )]
    pub is_mandatory: bool,
}

/// A feedback entry, by GenC and mentor associate id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFeedback {
    pub genc_associate_id: String,
    pub mentor_associate_id: String,
    pub date_of_feedback: NaiveDate,
    pub feedback: String,
}

/// Everything a bundle may carry. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedBundle {
    pub skills: Vec<NewSkill>,
    pub accounts: Vec<NewAccount>,
    pub service_lines: Vec<SeedServiceLine>,
    pub mentors: Vec<NewMentor>,
    pub gencs: Vec<SeedGenc>,
    pub genc_skills: Vec<SeedGencSkill>,
    pub requirements: Vec<SeedRequirement>,
    pub feedbacks: Vec<SeedFeedback>,
    pub users: Vec<NewApplicationUser>,
}

impl SeedBundle {
    /// Parse a bundle from JSON text.
    pub fn from_json(text: &str) -> Result<Self, GencError> {
        serde_json::from_str(text).map_err(|e| GencError::DeserializationError(e.to_string()))
    }

    fn check_size(&self) -> Result<(), GencError> {
        let sections = [
            ("skills", self.skills.len()),
            ("accounts", self.accounts.len()),
            ("service_lines", self.service_lines.len()),
            ("mentors", self.mentors.len()),
            ("gencs", self.gencs.len()),
            ("genc_skills", self.genc_skills.len()),
            ("requirements", self.requirements.len()),
            ("feedbacks", self.feedbacks.len()),
            ("users", self.users.len()),
        ];
        for (name, len) in sections {
            if len > MAX_IMPORT_RECORDS {
                return Err(GencError::invalid(
                    "bundle",
                    format!("{name} has {len} records, limit is {MAX_IMPORT_RECORDS}"),
                ));
            }
        }
        Ok(())
    }
}

/// Outcome of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Records written.
    pub created: usize,
    /// Records whose natural key was already stored.
    pub skipped: usize,
}

impl ImportReport {
    fn tally(&mut self, created: bool) {
        if created {
            self.created += 1;
        } else {
            self.skipped += 1;
        }
    }
}

fn unresolved(kind: &'static str, key: &str, context: &str) -> GencError {
    GencError::NotFound {
        entity: kind,
        key: format!("{key} (referenced by {context})"),
    }
}

// =============================================================================
// IMPORT
// =============================================================================

/// Natural keys already stored, read once per import and kept current as
/// records are written.
#[derive(Default)]
struct NaturalKeys {
    skills: BTreeMap<String, SkillId>,
    accounts: BTreeMap<String, AccountId>,
    service_lines: BTreeMap<(AccountId, String), ServiceLineId>,
    mentors: BTreeMap<String, MentorId>,
    gencs: BTreeMap<String, GencId>,
    feedbacks: BTreeSet<(GencId, MentorId, NaiveDate, String)>,
    users: BTreeSet<String>,
}

impl NaturalKeys {
    fn load(tracker: &Tracker) -> Result<Self, GencError> {
        Ok(Self {
            skills: tracker
                .all::<Skill>()?
                .into_iter()
                .map(|s| (s.skill_name, s.id))
                .collect(),
            accounts: tracker
                .all::<Account>()?
                .into_iter()
                .map(|a| (a.account_name, a.id))
                .collect(),
            service_lines: tracker
                .all::<ServiceLine>()?
                .into_iter()
                .map(|s| ((s.account_id, s.service_line), s.id))
                .collect(),
            mentors: tracker
                .all::<Mentor>()?
                .into_iter()
                .map(|m| (m.associate_id, m.id))
                .collect(),
            gencs: tracker
                .all::<Genc>()?
                .into_iter()
                .map(|g| (g.associate_id, g.id))
                .collect(),
            feedbacks: tracker
                .all::<GencFeedback>()?
                .into_iter()
                .map(|f| (f.genc_id, f.mentor_id, f.date_of_feedback, f.feedback))
                .collect(),
            users: tracker
                .all::<ApplicationUser>()?
                .into_iter()
                .map(|u| u.user_assoc_id)
                .collect(),
        })
    }

    fn skill(&self, name: &str, context: &str) -> Result<SkillId, GencError> {
        self.skills
            .get(name)
            .copied()
            .ok_or_else(|| unresolved("Skill", name, context))
    }

    fn account(&self, name: &str, context: &str) -> Result<AccountId, GencError> {
        self.accounts
            .get(name)
            .copied()
            .ok_or_else(|| unresolved("Account", name, context))
    }

    fn mentor(&self, associate_id: &str, context: &str) -> Result<MentorId, GencError> {
        self.mentors
            .get(associate_id)
            .copied()
            .ok_or_else(|| unresolved("Mentor", associate_id, context))
    }

    fn genc(&self, associate_id: &str, context: &str) -> Result<GencId, GencError> {
        self.gencs
            .get(associate_id)
            .copied()
            .ok_or_else(|| unresolved("GenC", associate_id, context))
    }
}

impl Tracker {
    /// Load a bundle.
    pub fn import_seed(&mut self, bundle: SeedBundle) -> Result<ImportReport, GencError> {
        bundle.check_size()?;
        let mut keys = NaturalKeys::load(self)?;
        let mut report = ImportReport::default();

        for skill in bundle.skills {
            let fresh = !keys.skills.contains_key(&skill.skill_name);
            if fresh {
                let created = self.create_skill(skill)?;
                keys.skills.insert(created.skill_name, created.id);
            }
            report.tally(fresh);
        }

        for account in bundle.accounts {
            let fresh = !keys.accounts.contains_key(&account.account_name);
            if fresh {
                let created = self.create_account(account)?;
                keys.accounts.insert(created.account_name, created.id);
            }
            report.tally(fresh);
        }

        for line in bundle.service_lines {
            let account_id = keys.account(&line.account_name, &line.service_line)?;
            let key = (account_id, line.service_line);
            let fresh = !keys.service_lines.contains_key(&key);
            if fresh {
                let created = self.create_service_line(NewServiceLine {
                    account_id,
                    service_line: key.1.clone(),
                    edl_name: line.edl_name,
                    pdl_name: line.pdl_name,
                    sl_spoc: line.sl_spoc,
                })?;
                keys.service_lines.insert(key, created.id);
            }
            report.tally(fresh);
        }

        for mentor in bundle.mentors {
            let fresh = !keys.mentors.contains_key(&mentor.associate_id);
            if fresh {
                let created = self.create_mentor(mentor)?;
                keys.mentors.insert(created.associate_id, created.id);
            }
            report.tally(fresh);
        }

        for genc in bundle.gencs {
            if keys.gencs.contains_key(&genc.associate_id) {
                report.tally(false);
                continue;
            }
            let new = resolve_genc(&keys, genc)?;
            let created = self.create_genc(new)?;
            keys.gencs.insert(created.associate_id, created.id);
            report.tally(true);
        }

        // Held skills and requirements upsert on their natural pair, so they
        // always count as written.
        for held in bundle.genc_skills {
            let context = format!("skill of GenC {}", held.genc_associate_id);
            self.add_genc_skill(NewGencSkill {
                genc_id: keys.genc(&held.genc_associate_id, &context)?,
                skill_id: keys.skill(&held.skill_name, &context)?,
                proficiency_level: held.proficiency_level,
                date_acquired: held.date_acquired,
                notes: held.notes,
            })?;
            report.tally(true);
        }

        for req in bundle.requirements {
            let context = format!("{} requirement", req.role);
            self.set_role_requirement(NewRoleSkillRequirement {
                role: req.role,
                skill_id: keys.skill(&req.skill_name, &context)?,
                required_proficiency_level: req.required_proficiency_level,
                is_mandatory: req.is_mandatory,
            })?;
            report.tally(true);
        }

        // Feedback has no natural key of its own; an entry matching a stored
        // one on GenC, mentor, date and text is the same entry.
        for fb in bundle.feedbacks {
            let context = format!("feedback on {}", fb.date_of_feedback);
            let genc_id = keys.genc(&fb.genc_associate_id, &context)?;
            let mentor_id = keys.mentor(&fb.mentor_associate_id, &context)?;
            let key = (genc_id, mentor_id, fb.date_of_feedback, fb.feedback);
            let fresh = !keys.feedbacks.contains(&key);
            if fresh {
                self.create_feedback(NewGencFeedback {
                    genc_id,
                    mentor_id,
                    date_of_feedback: key.2,
                    feedback: key.3.clone(),
                })?;
                keys.feedbacks.insert(key);
            }
            report.tally(fresh);
        }

        for user in bundle.users {
            let fresh = !keys.users.contains(&user.user_assoc_id);
            if fresh {
                let created = self.create_user(user)?;
                keys.users.insert(created.user_assoc_id);
            }
            report.tally(fresh);
        }

        Ok(report)
    }
}

fn resolve_genc(keys: &NaturalKeys, genc: SeedGenc) -> Result<NewGenc, GencError> {
    let context = format!("GenC {}", genc.associate_id);
    let account_id = keys.account(&genc.account_name, &context)?;
    let service_line_id = keys
        .service_lines
        .get(&(account_id, genc.service_line.clone()))
        .copied()
        .ok_or_else(|| unresolved("Account Service Line", &genc.service_line, &context))?;
    let mentor_id = keys.mentor(&genc.mentor_associate_id, &context)?;

    Ok(NewGenc {
        associate_id: genc.associate_id,
        genc_name: genc.genc_name,
        account_id,
        service_line_id,
        mentor_id,
        status: genc.status,
        date_of_joining: genc.date_of_joining,
        date_of_allocation: genc.date_of_allocation,
        allocation_project: genc.allocation_project,
        team_name: genc.team_name,
        location: genc.location,
        current_designation: genc.current_designation,
        planned_billing_start_date: genc.planned_billing_start_date,
        actual_billing_start_date: genc.actual_billing_start_date,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    const BUNDLE: &str = r#"{
        "skills": [
            {"skill_name": "Python", "category": "Programming"},
            {"skill_name": "SQL", "category": "Database"}
        ],
        "accounts": [{"account_name": "Contoso", "epl_name": "Meera", "edp_name": "Arjun"}],
        "service_lines": [{
            "account_name": "Contoso", "service_line": "Digital",
            "edl_name": "Kiran", "pdl_name": "Latha", "sl_spoc": "Nikhil"
        }],
        "mentors": [{"associate_id": "M1", "mentor_name": "Priya", "designation": "SM", "service_line": "Digital"}],
        "gencs": [{
            "associate_id": "G1", "genc_name": "Asha", "account_name": "Contoso",
            "service_line": "Digital", "mentor_associate_id": "M1",
            "status": "Under Project Training", "date_of_joining": "2024-07-01",
            "location": "Pune", "current_designation": "PA"
        }],
        "genc_skills": [{"genc_associate_id": "G1", "skill_name": "Python", "proficiency_level": "Beginner"}],
        "requirements": [
            {"role": "PA", "skill_name": "Python", "required_proficiency_level": "Advanced", "is_mandatory": "Yes"},
            {"role": "PA", "skill_name": "SQL", "required_proficiency_level": "Beginner"}
        ],
        "feedbacks": [{
            "genc_associate_id": "G1", "mentor_associate_id": "M1",
            "date_of_feedback": "2024-08-01", "feedback": "Good progress"
        }]
    }"#;

    #[test]
    fn bundle_imports_and_drives_matrix() {
        let mut tracker = Tracker::new();
        let report = tracker
            .import_seed(SeedBundle::from_json(BUNDLE).unwrap())
            .unwrap();
        assert_eq!(report.created, 10);
        assert_eq!(report.skipped, 0);

        let genc = tracker.genc_by_associate_id("G1").unwrap().unwrap();
        assert_eq!(genc.status, Status::UnderProjectTraining);

        let matrix = tracker.skill_matrix().unwrap();
        assert_eq!(matrix[0].skill_gaps_count, 2);
    }

    #[test]
    fn reimport_skips_natural_keys() {
        let mut tracker = Tracker::new();
        let bundle = SeedBundle::from_json(BUNDLE).unwrap();
        tracker.import_seed(bundle.clone()).unwrap();
        let again = tracker.import_seed(bundle).unwrap();

        assert_eq!(again.skipped, 7);
        assert_eq!(again.created, 3);
        let counts = tracker.counts().unwrap();
        assert_eq!(counts.gencs, 1);
        assert_eq!(counts.genc_skills, 1);
        assert_eq!(counts.role_requirements, 2);
        assert_eq!(counts.feedbacks, 1);
    }

    #[test]
    fn feedback_with_new_text_is_added() {
        let mut tracker = Tracker::new();
        let mut bundle = SeedBundle::from_json(BUNDLE).unwrap();
        tracker.import_seed(bundle.clone()).unwrap();

        bundle.feedbacks[0].feedback = "Ready for allocation".to_string();
        let again = tracker.import_seed(bundle).unwrap();

        assert_eq!(again.skipped, 6);
        assert_eq!(tracker.counts().unwrap().feedbacks, 2);
    }

    #[test]
    fn repeated_keys_within_one_bundle_are_skipped() {
        let mut tracker = Tracker::new();
        let python = NewSkill {
            skill_name: "Python".to_string(),
            description: None,
            category: None,
        };
        let bundle = SeedBundle {
            skills: vec![python.clone(), python],
            ..SeedBundle::default()
        };
        let report = tracker.import_seed(bundle).unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(tracker.counts().unwrap().skills, 1);
    }

    #[test]
    fn large_bundle_reimports_as_no_op() {
        let mut tracker = Tracker::new();
        let skills: Vec<NewSkill> = (0..500)
            .map(|i| NewSkill {
                skill_name: format!("skill-{i}"),
                description: None,
                category: None,
            })
            .collect();
        let bundle = SeedBundle {
            skills,
            ..SeedBundle::default()
        };
        tracker.import_seed(bundle.clone()).unwrap();
        let again = tracker.import_seed(bundle).unwrap();

        assert_eq!(again.created, 0);
        assert_eq!(again.skipped, 500);
        assert_eq!(tracker.counts().unwrap().skills, 500);
    }

    #[test]
    fn dangling_reference_is_named() {
        let mut tracker = Tracker::new();
        let bundle = SeedBundle {
            genc_skills: vec![SeedGencSkill {
                genc_associate_id: "nobody".to_string(),
                skill_name: "Python".to_string(),
                proficiency_level: ProficiencyLevel::Expert,
                date_acquired: None,
                notes: None,
            }],
            ..SeedBundle::default()
        };
        let err = tracker.import_seed(bundle).unwrap_err();
        assert!(err.to_string().contains("nobody"));
    }

    #[test]
    fn empty_bundle_is_fine() {
        let mut tracker = Tracker::new();
        let report = tracker.import_seed(SeedBundle::from_json("{}").unwrap()).unwrap();
        assert_eq!(report, ImportReport::default());
    }
}
