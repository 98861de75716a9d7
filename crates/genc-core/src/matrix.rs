//! # Skill Gap Matrix
//!
//! Cross-references the skills each GenC holds against the requirements of
//! the GenC's current role.
//!
//! A **skill gap** is either:
//! - a held skill whose level ranks below the role's required level, or
//! - a mandatory requirement of the role the GenC does not hold at all.
//!
//! The two buckets are disjoint: a skill cannot be both held and missing.
//!
//! Reports are pure functions of their inputs. Building twice over unchanged
//! inputs yields identical output, and nothing here is ever persisted.

use crate::{Designation, ProficiencyLevel};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// INPUTS
// =============================================================================

/// A skill held by a GenC, joined with its skill record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldSkill {
    pub skill_name: String,
    pub category: Option<String>,
    pub proficiency_level: ProficiencyLevel,
    pub date_acquired: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// The slice of a GenC the matrix needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GencProfile {
    pub associate_id: String,
    pub genc_name: String,
    pub current_designation: Designation,
    pub skills: Vec<HeldSkill>,
}

/// A role requirement, joined with its skill record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementEntry {
    pub role: Designation,
    pub skill_name: String,
    pub category: Option<String>,
    pub required_proficiency_level: ProficiencyLevel,
    pub is_mandatory: bool,
}

// =============================================================================
// OUTPUTS
// =============================================================================

/// One held skill, judged against the role's bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillStanding {
    pub skill_name: String,
    pub proficiency_level: ProficiencyLevel,
    pub category: Option<String>,
    pub date_acquired: Option<NaiveDate>,
    pub notes: Option<String>,
    /// `None` when the role sets no bar for this skill.
    pub required_proficiency_level: Option<ProficiencyLevel>,
    pub is_mandatory: bool,
    pub meets_requirement: bool,
}

/// A mandatory skill the GenC does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingSkill {
    pub skill_name: String,
    pub required_proficiency_level: ProficiencyLevel,
    pub is_mandatory: bool,
    pub is_missing: bool,
}

/// Per-GenC gap report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GencSkillReport {
    pub associate_id: String,
    pub genc_name: String,
    pub current_designation: Designation,
    pub skills: Vec<SkillStanding>,
    pub missing_mandatory_skills: Vec<MissingSkill>,
    pub skill_gaps_count: usize,
}

impl GencSkillReport {
    /// True if the GenC meets every bar of its role.
    #[must_use]
    pub fn is_compliant(&self) -> bool {
        self.skill_gaps_count == 0
    }
}

/// One requirement inside a [`RoleRequirements`] group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRequirementLine {
    pub skill_name: String,
    pub required_proficiency_level: ProficiencyLevel,
    pub is_mandatory: bool,
    pub category: Option<String>,
}

/// All requirements of one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRequirements {
    pub role: Designation,
    pub requirements: Vec<RoleRequirementLine>,
}

/// Aggregate counts over a set of reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixSummary {
    pub genc_count: usize,
    pub compliant_count: usize,
    pub with_gaps_count: usize,
    pub total_gaps: usize,
    pub missing_mandatory_total: usize,
}

// =============================================================================
// REQUIREMENT INDEX
// =============================================================================

/// The bar a role sets for one skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequirementBar {
    pub required: ProficiencyLevel,
    pub mandatory: bool,
}

/// Two-level index: role -> skill name -> bar.
///
/// Built once per matrix request so per-GenC lookups never rescan the
/// requirement list. Unambiguous because (role, skill) is unique in storage;
/// if duplicates are fed in anyway, the last one wins.
#[derive(Debug, Clone, Default)]
pub struct RequirementIndex {
    by_role: BTreeMap<Designation, BTreeMap<String, RequirementBar>>,
}

impl RequirementIndex {
    /// Index a requirement list.
    #[must_use]
    pub fn build(requirements: &[RequirementEntry]) -> Self {
        let mut by_role: BTreeMap<Designation, BTreeMap<String, RequirementBar>> = BTreeMap::new();
        for req in requirements {
            by_role.entry(req.role).or_default().insert(
                req.skill_name.clone(),
                RequirementBar {
                    required: req.required_proficiency_level,
                    mandatory: req.is_mandatory,
                },
            );
        }
        Self { by_role }
    }

    /// Bars for a role, if the role has any.
    #[must_use]
    pub fn for_role(&self, role: Designation) -> Option<&BTreeMap<String, RequirementBar>> {
        self.by_role.get(&role)
    }

    /// Judge a single GenC.
    #[must_use]
    pub fn report(&self, genc: &GencProfile) -> GencSkillReport {
        let empty = BTreeMap::new();
        let bars = self.for_role(genc.current_designation).unwrap_or(&empty);

        let skills: Vec<SkillStanding> = genc
            .skills
            .iter()
            .map(|held| {
                let bar = bars.get(&held.skill_name);
                SkillStanding {
                    skill_name: held.skill_name.clone(),
                    proficiency_level: held.proficiency_level,
                    category: held.category.clone(),
                    date_acquired: held.date_acquired,
                    notes: held.notes.clone(),
                    required_proficiency_level: bar.map(|b| b.required),
                    is_mandatory: bar.is_some_and(|b| b.mandatory),
                    meets_requirement: bar
                        .is_none_or(|b| held.proficiency_level.satisfies(b.required)),
                }
            })
            .collect();

        let held_names: BTreeSet<&str> = genc.skills.iter().map(|s| s.skill_name.as_str()).collect();
        let missing_mandatory_skills: Vec<MissingSkill> = bars
            .iter()
            .filter(|(name, bar)| bar.mandatory && !held_names.contains(name.as_str()))
            .map(|(name, bar)| MissingSkill {
                skill_name: name.clone(),
                required_proficiency_level: bar.required,
                is_mandatory: true,
                is_missing: true,
            })
            .collect();

        let below_bar = skills.iter().filter(|s| !s.meets_requirement).count();
        let skill_gaps_count = below_bar.saturating_add(missing_mandatory_skills.len());

        GencSkillReport {
            associate_id: genc.associate_id.clone(),
            genc_name: genc.genc_name.clone(),
            current_designation: genc.current_designation,
            skills,
            missing_mandatory_skills,
            skill_gaps_count,
        }
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

/// Build one gap report per GenC, in input order.
#[must_use]
pub fn build_skill_matrix(
    gencs: &[GencProfile],
    requirements: &[RequirementEntry],
) -> Vec<GencSkillReport> {
    let index = RequirementIndex::build(requirements);
    gencs.iter().map(|genc| index.report(genc)).collect()
}

/// Group requirements by role, independent of any GenC.
///
/// Roles without requirements are omitted. Within a role, requirements keep
/// their input order.
#[must_use]
pub fn build_role_requirements_matrix(requirements: &[RequirementEntry]) -> Vec<RoleRequirements> {
    let mut grouped: BTreeMap<Designation, Vec<RoleRequirementLine>> = BTreeMap::new();
    for req in requirements {
        grouped.entry(req.role).or_default().push(RoleRequirementLine {
            skill_name: req.skill_name.clone(),
            required_proficiency_level: req.required_proficiency_level,
            is_mandatory: req.is_mandatory,
            category: req.category.clone(),
        });
    }
    grouped
        .into_iter()
        .map(|(role, requirements)| RoleRequirements { role, requirements })
        .collect()
}

/// Summarise a set of reports.
#[must_use]
pub fn summarize(reports: &[GencSkillReport]) -> MatrixSummary {
    reports.iter().fold(MatrixSummary::default(), |mut acc, r| {
        acc.genc_count += 1;
        if r.is_compliant() {
            acc.compliant_count += 1;
        } else {
            acc.with_gaps_count += 1;
        }
        acc.total_gaps = acc.total_gaps.saturating_add(r.skill_gaps_count);
        acc.missing_mandatory_total = acc
            .missing_mandatory_total
            .saturating_add(r.missing_mandatory_skills.len());
        acc
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ProficiencyLevel::{Advanced, Beginner, Expert, Intermediate};

    fn held(name: &str, level: ProficiencyLevel) -> HeldSkill {
        HeldSkill {
            skill_name: name.to_string(),
            category: Some("Programming".to_string()),
            proficiency_level: level,
            date_acquired: None,
            notes: None,
        }
    }

    fn genc(id: &str, role: Designation, skills: Vec<HeldSkill>) -> GencProfile {
        GencProfile {
            associate_id: id.to_string(),
            genc_name: format!("GenC {id}"),
            current_designation: role,
            skills,
        }
    }

    fn req(role: Designation, name: &str, level: ProficiencyLevel, mandatory: bool) -> RequirementEntry {
        RequirementEntry {
            role,
            skill_name: name.to_string(),
            category: None,
            required_proficiency_level: level,
            is_mandatory: mandatory,
        }
    }

    #[test]
    fn held_skill_below_bar_is_a_gap() {
        let gencs = vec![genc("1", Designation::A, vec![held("Python", Beginner)])];
        let reqs = vec![req(Designation::A, "Python", Advanced, true)];

        let report = &build_skill_matrix(&gencs, &reqs)[0];

        assert_eq!(report.skills.len(), 1);
        let python = &report.skills[0];
        assert!(!python.meets_requirement);
        assert_eq!(python.required_proficiency_level, Some(Advanced));
        assert!(python.is_mandatory);
        assert!(report.missing_mandatory_skills.is_empty());
        assert_eq!(report.skill_gaps_count, 1);
    }

    #[test]
    fn missing_mandatory_skill_is_a_separate_gap() {
        let gencs = vec![genc("2", Designation::Pa, vec![held("Python", Expert)])];
        let reqs = vec![req(Designation::Pa, "SQL", Intermediate, true)];

        let report = &build_skill_matrix(&gencs, &reqs)[0];

        assert_eq!(report.missing_mandatory_skills.len(), 1);
        assert_eq!(report.missing_mandatory_skills[0].skill_name, "SQL");
        assert!(report.missing_mandatory_skills[0].is_missing);
        assert!(report.skills.iter().all(|s| s.skill_name != "SQL"));
        assert_eq!(report.skill_gaps_count, 1);
    }

    #[test]
    fn optional_requirement_not_held_is_not_missing() {
        let gencs = vec![genc("3", Designation::Pa, vec![])];
        let reqs = vec![req(Designation::Pa, "Docker", Advanced, false)];

        let report = &build_skill_matrix(&gencs, &reqs)[0];
        assert!(report.missing_mandatory_skills.is_empty());
        assert_eq!(report.skill_gaps_count, 0);
    }

    #[test]
    fn optional_requirement_held_below_bar_still_counts() {
        let gencs = vec![genc("4", Designation::Pa, vec![held("Docker", Beginner)])];
        let reqs = vec![req(Designation::Pa, "Docker", Advanced, false)];

        let report = &build_skill_matrix(&gencs, &reqs)[0];
        assert!(!report.skills[0].is_mandatory);
        assert!(!report.skills[0].meets_requirement);
        assert_eq!(report.skill_gaps_count, 1);
    }

    #[test]
    fn skill_without_bar_trivially_meets() {
        let gencs = vec![genc("5", Designation::A, vec![held("Rust", Beginner)])];
        let reqs = vec![req(Designation::Pa, "Rust", Expert, true)];

        let report = &build_skill_matrix(&gencs, &reqs)[0];
        assert!(report.skills[0].meets_requirement);
        assert_eq!(report.skills[0].required_proficiency_level, None);
        assert!(!report.skills[0].is_mandatory);
        assert_eq!(report.skill_gaps_count, 0);
    }

    #[test]
    fn role_without_requirements_has_no_gaps() {
        let gencs = vec![genc(
            "6",
            Designation::Pat,
            vec![held("Python", Beginner), held("SQL", Intermediate)],
        )];
        let reqs = vec![req(Designation::A, "Python", Expert, true)];

        let report = &build_skill_matrix(&gencs, &reqs)[0];
        assert!(report.missing_mandatory_skills.is_empty());
        assert!(report.skills.iter().all(|s| s.meets_requirement));
        assert!(report.is_compliant());
    }

    #[test]
    fn exact_level_meets_requirement() {
        let gencs = vec![genc("7", Designation::A, vec![held("Java", Advanced)])];
        let reqs = vec![req(Designation::A, "Java", Advanced, true)];
        assert!(build_skill_matrix(&gencs, &reqs)[0].skills[0].meets_requirement);
    }

    #[test]
    fn unheld_requirement_reported_missing_for_every_genc_of_role() {
        let gencs = vec![
            genc("8", Designation::Pa, vec![]),
            genc("9", Designation::Pa, vec![held("Python", Expert)]),
            genc("10", Designation::A, vec![]),
        ];
        let reqs = vec![req(Designation::Pa, "Kubernetes", Beginner, true)];

        let reports = build_skill_matrix(&gencs, &reqs);
        assert_eq!(reports[0].missing_mandatory_skills.len(), 1);
        assert_eq!(reports[1].missing_mandatory_skills.len(), 1);
        assert!(reports[2].missing_mandatory_skills.is_empty());
    }

    #[test]
    fn both_buckets_add_up() {
        let gencs = vec![genc(
            "11",
            Designation::Pa,
            vec![held("Python", Beginner), held("Git", Expert)],
        )];
        let reqs = vec![
            req(Designation::Pa, "Python", Intermediate, true),
            req(Designation::Pa, "SQL", Beginner, true),
            req(Designation::Pa, "AWS", Advanced, true),
            req(Designation::Pa, "Git", Intermediate, false),
        ];

        let report = &build_skill_matrix(&gencs, &reqs)[0];
        let missing: Vec<&str> = report
            .missing_mandatory_skills
            .iter()
            .map(|m| m.skill_name.as_str())
            .collect();
        assert_eq!(missing, vec!["AWS", "SQL"]);
        assert_eq!(report.skill_gaps_count, 3);
    }

    #[test]
    fn rebuilding_is_identical() {
        let gencs = vec![
            genc("12", Designation::A, vec![held("Python", Beginner)]),
            genc("13", Designation::Pa, vec![]),
        ];
        let reqs = vec![
            req(Designation::A, "Python", Advanced, true),
            req(Designation::Pa, "SQL", Beginner, true),
        ];
        assert_eq!(build_skill_matrix(&gencs, &reqs), build_skill_matrix(&gencs, &reqs));
    }

    #[test]
    fn role_matrix_groups_by_role() {
        let reqs = vec![
            req(Designation::Pa, "SQL", Beginner, true),
            req(Designation::A, "Python", Advanced, true),
            req(Designation::Pa, "Python", Intermediate, false),
        ];
        let roles = build_role_requirements_matrix(&reqs);

        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].role, Designation::A);
        assert_eq!(roles[1].role, Designation::Pa);
        let pa: Vec<&str> = roles[1].requirements.iter().map(|r| r.skill_name.as_str()).collect();
        assert_eq!(pa, vec!["SQL", "Python"]);
    }

    #[test]
    fn role_matrix_empty_input() {
        assert!(build_role_requirements_matrix(&[]).is_empty());
    }

    #[test]
    fn summary_counts() {
        let gencs = vec![
            genc("14", Designation::A, vec![held("Python", Beginner)]),
            genc("15", Designation::A, vec![held("Python", Expert)]),
            genc("16", Designation::Pa, vec![]),
        ];
        let reqs = vec![
            req(Designation::A, "Python", Advanced, true),
            req(Designation::Pa, "SQL", Beginner, true),
        ];
        let summary = summarize(&build_skill_matrix(&gencs, &reqs));

        assert_eq!(summary.genc_count, 3);
        assert_eq!(summary.compliant_count, 1);
        assert_eq!(summary.with_gaps_count, 2);
        assert_eq!(summary.total_gaps, 2);
        assert_eq!(summary.missing_mandatory_total, 1);
    }

    #[test]
    fn report_serializes_with_wire_field_names() {
        let gencs = vec![genc("17", Designation::Pat, vec![held("Python", Intermediate)])];
        let report = &build_skill_matrix(&gencs, &[])[0];
        let json = serde_json::to_value(report).unwrap_or_default();

        assert_eq!(json["associate_id"], "17");
        assert_eq!(json["genc_name"], "GenC 17");
        assert_eq!(json["current_designation"], "PAT");
        assert_eq!(json["skills"][0]["proficiency_level"], "Intermediate");
        assert!(json["skills"][0]["required_proficiency_level"].is_null());
        assert!(json["missing_mandatory_skills"].as_array().is_some());
        assert_eq!(json["skill_gaps_count"], 0);
    }
}
