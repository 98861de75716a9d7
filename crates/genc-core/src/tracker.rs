//! # Tracker
//!
//! The record engine: every create, read, update and delete goes through
//! here, on top of a pluggable storage backend.
//!
//! ## Storage Backends
//!
//! - `InMemory`: `MemoryStore` (fast, volatile)
//! - `Persistent`: `RedbStore` (disk-backed, ACID)
//!
//! ## Write discipline
//!
//! Each mutating call validates fully before it queues anything, then
//! commits a single [`WriteBatch`]. A rejected call leaves the store
//! unchanged. Mutations take `&mut self`, so callers sharing a tracker
//! behind a lock get read-validate-write as one critical section.

use crate::lifecycle::validate_transition;
use crate::matrix::{
    GencProfile, GencSkillReport, HeldSkill, RequirementEntry, RoleRequirements,
    build_role_requirements_matrix, build_skill_matrix,
};
use crate::storage::{self, MemoryStore, Record, RecordStore, RedbStore, WriteBatch};
use crate::types::{
    Account, AccountId, ApplicationUser, Designation, FeedbackId, Genc, GencFeedback, GencId,
    GencSkill, GencSkillId, GencSkillPatch, Mentor, MentorId, NewAccount, NewApplicationUser,
    NewGenc, NewGencFeedback, NewGencSkill, NewMentor, NewRoleSkillRequirement, NewServiceLine,
    NewSkill, Page, RequirementId, RoleSkillRequirement, ServiceLine, ServiceLineId, Skill,
    SkillId, Status, UserId,
};
use crate::validation::Validate;
use crate::GencError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Storage backend for a Tracker.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory tables (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed tables using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

/// Number of stored records per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub accounts: usize,
    pub service_lines: usize,
    pub mentors: usize,
    pub skills: usize,
    pub gencs: usize,
    pub genc_skills: usize,
    pub role_requirements: usize,
    pub feedbacks: usize,
    pub users: usize,
}

/// The GenC tracker.
#[derive(Debug, Default)]
pub struct Tracker {
    backend: StorageBackend,
}

impl Tracker {
    /// Create an empty tracker with in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker with persistent redb storage.
    ///
    /// Opens or creates a redb database at the given path.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, GencError> {
        Ok(Self {
            backend: StorageBackend::Persistent(RedbStore::open(path)?),
        })
    }

    /// Check if this tracker writes to disk.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    /// Short backend name for status output.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            StorageBackend::InMemory(_) => "memory",
            StorageBackend::Persistent(_) => "redb",
        }
    }

    // =========================================================================
    // STORAGE PLUMBING
    // =========================================================================

    fn store(&self) -> &dyn RecordStore {
        match &self.backend {
            StorageBackend::InMemory(s) => s,
            StorageBackend::Persistent(s) => s,
        }
    }

    fn store_mut(&mut self) -> &mut dyn RecordStore {
        match &mut self.backend {
            StorageBackend::InMemory(s) => s,
            StorageBackend::Persistent(s) => s,
        }
    }

    fn find<R: Record>(&self, key: u64) -> Result<Option<R>, GencError> {
        storage::get(self.store(), key)
    }

    fn require<R: Record>(&self, key: u64) -> Result<R, GencError> {
        self.find(key)?
            .ok_or_else(|| GencError::not_found(R::KIND, key))
    }

    pub(crate) fn all<R: Record>(&self) -> Result<Vec<R>, GencError> {
        storage::list(self.store())
    }

    fn all_where<R: Record>(&self, keep: impl Fn(&R) -> bool) -> Result<Vec<R>, GencError> {
        Ok(self.all::<R>()?.into_iter().filter(|r| keep(r)).collect())
    }

    fn first_where<R: Record>(&self, hit: impl Fn(&R) -> bool) -> Result<Option<R>, GencError> {
        Ok(self.all::<R>()?.into_iter().find(|r| hit(r)))
    }

    fn next_id(&mut self, table: &'static str) -> Result<u64, GencError> {
        self.store_mut().allocate_id(table)
    }

    fn save<R: Record>(&mut self, record: &R) -> Result<(), GencError> {
        let mut batch = WriteBatch::new();
        batch.put(record)?;
        self.store_mut().commit(batch)
    }

    fn remove<R: Record>(&mut self, key: u64) -> Result<R, GencError> {
        let record = self.require::<R>(key)?;
        let mut batch = WriteBatch::new();
        batch.delete::<R>(key);
        self.store_mut().commit(batch)?;
        Ok(record)
    }

    /// Fail with `AlreadyExists` if any record other than `except` clashes.
    fn ensure_unique<R: Record>(
        &self,
        natural_key: &str,
        except: Option<u64>,
        clash: impl Fn(&R) -> bool,
    ) -> Result<(), GencError> {
        let taken = self
            .all::<R>()?
            .iter()
            .any(|r| Some(r.key()) != except && clash(r));
        if taken {
            Err(GencError::already_exists(R::KIND, natural_key))
        } else {
            Ok(())
        }
    }

    /// Fail with `InUse` if `referrers` is non-zero.
    fn ensure_unreferenced<R: Record>(key: u64, referrers: &[(usize, &str)]) -> Result<(), GencError> {
        let held: Vec<String> = referrers
            .iter()
            .filter(|(n, _)| *n > 0)
            .map(|(n, kind)| format!("{n} {kind}(s)"))
            .collect();
        if held.is_empty() {
            Ok(())
        } else {
            Err(GencError::InUse {
                entity: R::KIND,
                key: key.to_string(),
                referrers: held.join(", "),
            })
        }
    }

    /// Per-kind record counts.
    pub fn counts(&self) -> Result<RecordCounts, GencError> {
        let store = self.store();
        Ok(RecordCounts {
            accounts: store.count(Account::TABLE)?,
            service_lines: store.count(ServiceLine::TABLE)?,
            mentors: store.count(Mentor::TABLE)?,
            skills: store.count(Skill::TABLE)?,
            gencs: store.count(Genc::TABLE)?,
            genc_skills: store.count(GencSkill::TABLE)?,
            role_requirements: store.count(RoleSkillRequirement::TABLE)?,
            feedbacks: store.count(GencFeedback::TABLE)?,
            users: store.count(ApplicationUser::TABLE)?,
        })
    }

    // =========================================================================
    // ACCOUNTS
    // =========================================================================

    pub fn create_account(&mut self, new: NewAccount) -> Result<Account, GencError> {
        new.validate()?;
        self.ensure_unique::<Account>(&new.account_name, None, |a| {
            a.account_name == new.account_name
        })?;
        let id = AccountId(self.next_id(Account::TABLE)?);
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    pub fn account(&self, id: AccountId) -> Result<Account, GencError> {
        self.require(id.0)
    }

    pub fn accounts(&self, page: Page) -> Result<Vec<Account>, GencError> {
        Ok(page.apply(self.all()?))
    }

    pub fn account_by_name(&self, name: &str) -> Result<Option<Account>, GencError> {
        self.first_where(|a: &Account| a.account_name == name)
    }

    pub fn update_account(&mut self, id: AccountId, new: NewAccount) -> Result<Account, GencError> {
        self.require::<Account>(id.0)?;
        new.validate()?;
        self.ensure_unique::<Account>(&new.account_name, Some(id.0), |a| {
            a.account_name == new.account_name
        })?;
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    /// Refused while service lines or GenCs still point at the account.
    pub fn delete_account(&mut self, id: AccountId) -> Result<Account, GencError> {
        self.require::<Account>(id.0)?;
        let lines = self.all_where(|s: &ServiceLine| s.account_id == id)?.len();
        let gencs = self.all_where(|g: &Genc| g.account_id == id)?.len();
        Self::ensure_unreferenced::<Account>(
            id.0,
            &[(lines, ServiceLine::KIND), (gencs, Genc::KIND)],
        )?;
        self.remove(id.0)
    }

    // =========================================================================
    // ACCOUNT SERVICE LINES
    // =========================================================================

    pub fn create_service_line(&mut self, new: NewServiceLine) -> Result<ServiceLine, GencError> {
        new.validate()?;
        self.require::<Account>(new.account_id.0)?;
        let id = ServiceLineId(self.next_id(ServiceLine::TABLE)?);
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    pub fn service_line(&self, id: ServiceLineId) -> Result<ServiceLine, GencError> {
        self.require(id.0)
    }

    pub fn service_lines(&self, page: Page) -> Result<Vec<ServiceLine>, GencError> {
        Ok(page.apply(self.all()?))
    }

    pub fn service_lines_for_account(&self, account: AccountId) -> Result<Vec<ServiceLine>, GencError> {
        self.require::<Account>(account.0)?;
        self.all_where(|s: &ServiceLine| s.account_id == account)
    }

    pub fn update_service_line(
        &mut self,
        id: ServiceLineId,
        new: NewServiceLine,
    ) -> Result<ServiceLine, GencError> {
        self.require::<ServiceLine>(id.0)?;
        new.validate()?;
        self.require::<Account>(new.account_id.0)?;
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    /// Refused while GenCs are still placed on the service line.
    pub fn delete_service_line(&mut self, id: ServiceLineId) -> Result<ServiceLine, GencError> {
        self.require::<ServiceLine>(id.0)?;
        let gencs = self.all_where(|g: &Genc| g.service_line_id == id)?.len();
        Self::ensure_unreferenced::<ServiceLine>(id.0, &[(gencs, Genc::KIND)])?;
        self.remove(id.0)
    }

    // =========================================================================
    // MENTORS
    // =========================================================================

    pub fn create_mentor(&mut self, new: NewMentor) -> Result<Mentor, GencError> {
        new.validate()?;
        self.ensure_unique::<Mentor>(&new.associate_id, None, |m| {
            m.associate_id == new.associate_id
        })?;
        let id = MentorId(self.next_id(Mentor::TABLE)?);
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    pub fn mentor(&self, id: MentorId) -> Result<Mentor, GencError> {
        self.require(id.0)
    }

    pub fn mentors(&self, page: Page) -> Result<Vec<Mentor>, GencError> {
        Ok(page.apply(self.all()?))
    }

    pub fn mentor_by_associate_id(&self, associate_id: &str) -> Result<Option<Mentor>, GencError> {
        self.first_where(|m: &Mentor| m.associate_id == associate_id)
    }

    pub fn update_mentor(&mut self, id: MentorId, new: NewMentor) -> Result<Mentor, GencError> {
        self.require::<Mentor>(id.0)?;
        new.validate()?;
        self.ensure_unique::<Mentor>(&new.associate_id, Some(id.0), |m| {
            m.associate_id == new.associate_id
        })?;
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    /// Refused while GenCs or feedback entries still name the mentor.
    pub fn delete_mentor(&mut self, id: MentorId) -> Result<Mentor, GencError> {
        self.require::<Mentor>(id.0)?;
        let gencs = self.all_where(|g: &Genc| g.mentor_id == id)?.len();
        let feedbacks = self.all_where(|f: &GencFeedback| f.mentor_id == id)?.len();
        Self::ensure_unreferenced::<Mentor>(
            id.0,
            &[(gencs, Genc::KIND), (feedbacks, GencFeedback::KIND)],
        )?;
        self.remove(id.0)
    }

    // =========================================================================
    // SKILLS
    // =========================================================================

    pub fn create_skill(&mut self, new: NewSkill) -> Result<Skill, GencError> {
        new.validate()?;
        self.ensure_unique::<Skill>(&new.skill_name, None, |s| s.skill_name == new.skill_name)?;
        let id = SkillId(self.next_id(Skill::TABLE)?);
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    pub fn skill(&self, id: SkillId) -> Result<Skill, GencError> {
        self.require(id.0)
    }

    pub fn skills(&self, page: Page) -> Result<Vec<Skill>, GencError> {
        Ok(page.apply(self.all()?))
    }

    pub fn skill_by_name(&self, name: &str) -> Result<Option<Skill>, GencError> {
        self.first_where(|s: &Skill| s.skill_name == name)
    }

    pub fn skills_by_category(&self, category: &str) -> Result<Vec<Skill>, GencError> {
        self.all_where(|s: &Skill| s.category.as_deref() == Some(category))
    }

    pub fn update_skill(&mut self, id: SkillId, new: NewSkill) -> Result<Skill, GencError> {
        self.require::<Skill>(id.0)?;
        new.validate()?;
        self.ensure_unique::<Skill>(&new.skill_name, Some(id.0), |s| {
            s.skill_name == new.skill_name
        })?;
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    /// Delete a skill together with every holding and requirement on it.
    pub fn delete_skill(&mut self, id: SkillId) -> Result<Skill, GencError> {
        let skill = self.require::<Skill>(id.0)?;
        let mut batch = WriteBatch::new();
        for held in self.all_where(|gs: &GencSkill| gs.skill_id == id)? {
            batch.delete::<GencSkill>(held.id.0);
        }
        for req in self.all_where(|r: &RoleSkillRequirement| r.skill_id == id)? {
            batch.delete::<RoleSkillRequirement>(req.id.0);
        }
        batch.delete::<Skill>(id.0);
        self.store_mut().commit(batch)?;
        Ok(skill)
    }

    // =========================================================================
    // GENCS
    // =========================================================================

    fn check_genc_refs(&self, new: &NewGenc) -> Result<(), GencError> {
        self.require::<Account>(new.account_id.0)?;
        let line = self.require::<ServiceLine>(new.service_line_id.0)?;
        if line.account_id != new.account_id {
            return Err(GencError::invalid(
                "service_line_id",
                format!(
                    "service line {} belongs to account {}, not {}",
                    line.id, line.account_id, new.account_id
                ),
            ));
        }
        self.require::<Mentor>(new.mentor_id.0)?;
        Ok(())
    }

    /// Register a GenC. Status defaults to Idle but any status is accepted,
    /// since records migrated from elsewhere may already be mid-lifecycle.
    pub fn create_genc(&mut self, new: NewGenc) -> Result<Genc, GencError> {
        new.validate()?;
        self.ensure_unique::<Genc>(&new.associate_id, None, |g| {
            g.associate_id == new.associate_id
        })?;
        self.check_genc_refs(&new)?;
        let id = GencId(self.next_id(Genc::TABLE)?);
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    pub fn genc(&self, id: GencId) -> Result<Genc, GencError> {
        self.require(id.0)
    }

    pub fn gencs(&self, page: Page) -> Result<Vec<Genc>, GencError> {
        Ok(page.apply(self.all()?))
    }

    pub fn genc_by_associate_id(&self, associate_id: &str) -> Result<Option<Genc>, GencError> {
        self.first_where(|g: &Genc| g.associate_id == associate_id)
    }

    pub fn gencs_with_status(&self, status: Status) -> Result<Vec<Genc>, GencError> {
        self.all_where(|g: &Genc| g.status == status)
    }

    /// Number of GenCs in each status. Every status is present, possibly 0.
    pub fn status_counts(&self) -> Result<BTreeMap<Status, usize>, GencError> {
        let mut counts: BTreeMap<Status, usize> = Status::ALL.iter().map(|&s| (s, 0)).collect();
        for genc in self.all::<Genc>()? {
            *counts.entry(genc.status).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Replace a GenC.
    ///
    /// The status change is checked against the lifecycle table before
    /// anything else; an illegal move leaves the stored record untouched.
    pub fn update_genc(&mut self, id: GencId, update: NewGenc) -> Result<Genc, GencError> {
        let current = self.require::<Genc>(id.0)?;
        validate_transition(current.status, update.status)?;
        update.validate()?;
        self.ensure_unique::<Genc>(&update.associate_id, Some(id.0), |g| {
            g.associate_id == update.associate_id
        })?;
        self.check_genc_refs(&update)?;
        let record = update.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    /// Move a GenC to `proposed`, leaving every other field as stored.
    pub fn transition_status(&mut self, id: GencId, proposed: Status) -> Result<Genc, GencError> {
        let mut genc = self.require::<Genc>(id.0)?;
        validate_transition(genc.status, proposed)?;
        genc.status = proposed;
        self.save(&genc)?;
        Ok(genc)
    }

    /// Delete a GenC together with its skills and feedback.
    pub fn delete_genc(&mut self, id: GencId) -> Result<Genc, GencError> {
        let genc = self.require::<Genc>(id.0)?;
        let mut batch = WriteBatch::new();
        for held in self.all_where(|gs: &GencSkill| gs.genc_id == id)? {
            batch.delete::<GencSkill>(held.id.0);
        }
        for fb in self.all_where(|f: &GencFeedback| f.genc_id == id)? {
            batch.delete::<GencFeedback>(fb.id.0);
        }
        batch.delete::<Genc>(id.0);
        self.store_mut().commit(batch)?;
        Ok(genc)
    }

    // =========================================================================
    // GENC SKILLS
    // =========================================================================

    /// Record that a GenC holds a skill.
    ///
    /// If the pair is already recorded, the existing entry is overwritten in
    /// place and keeps its identifier.
    pub fn add_genc_skill(&mut self, new: NewGencSkill) -> Result<GencSkill, GencError> {
        new.validate()?;
        self.require::<Genc>(new.genc_id.0)?;
        self.require::<Skill>(new.skill_id.0)?;
        let existing = self.first_where(|gs: &GencSkill| {
            gs.genc_id == new.genc_id && gs.skill_id == new.skill_id
        })?;
        let id = match existing {
            Some(gs) => gs.id,
            None => GencSkillId(self.next_id(GencSkill::TABLE)?),
        };
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    pub fn genc_skill(&self, id: GencSkillId) -> Result<GencSkill, GencError> {
        self.require(id.0)
    }

    pub fn genc_skills(&self, page: Page) -> Result<Vec<GencSkill>, GencError> {
        Ok(page.apply(self.all()?))
    }

    pub fn skills_for_genc(&self, genc: GencId) -> Result<Vec<GencSkill>, GencError> {
        self.require::<Genc>(genc.0)?;
        self.all_where(|gs: &GencSkill| gs.genc_id == genc)
    }

    pub fn gencs_with_skill(&self, skill: SkillId) -> Result<Vec<GencSkill>, GencError> {
        self.require::<Skill>(skill.0)?;
        self.all_where(|gs: &GencSkill| gs.skill_id == skill)
    }

    pub fn update_genc_skill(
        &mut self,
        id: GencSkillId,
        patch: GencSkillPatch,
    ) -> Result<GencSkill, GencError> {
        let mut record = self.require::<GencSkill>(id.0)?;
        patch.apply(&mut record);
        NewGencSkill {
            genc_id: record.genc_id,
            skill_id: record.skill_id,
            proficiency_level: record.proficiency_level,
            date_acquired: record.date_acquired,
            notes: record.notes.clone(),
        }
        .validate()?;
        self.save(&record)?;
        Ok(record)
    }

    pub fn delete_genc_skill(&mut self, id: GencSkillId) -> Result<GencSkill, GencError> {
        self.remove(id.0)
    }

    // =========================================================================
    // ROLE SKILL REQUIREMENTS
    // =========================================================================

    /// Set a role's bar for a skill, overwriting any existing bar for the
    /// same (role, skill) pair.
    pub fn set_role_requirement(
        &mut self,
        new: NewRoleSkillRequirement,
    ) -> Result<RoleSkillRequirement, GencError> {
        new.validate()?;
        self.require::<Skill>(new.skill_id.0)?;
        let existing = self.first_where(|r: &RoleSkillRequirement| {
            r.role == new.role && r.skill_id == new.skill_id
        })?;
        let id = match existing {
            Some(r) => r.id,
            None => RequirementId(self.next_id(RoleSkillRequirement::TABLE)?),
        };
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    pub fn role_requirement(&self, id: RequirementId) -> Result<RoleSkillRequirement, GencError> {
        self.require(id.0)
    }

    pub fn role_requirements(&self, page: Page) -> Result<Vec<RoleSkillRequirement>, GencError> {
        Ok(page.apply(self.all()?))
    }

    pub fn requirements_for_role(
        &self,
        role: Designation,
    ) -> Result<Vec<RoleSkillRequirement>, GencError> {
        self.all_where(|r: &RoleSkillRequirement| r.role == role)
    }

    /// Replace a requirement. Moving it onto a (role, skill) pair that
    /// another requirement already covers is refused.
    pub fn update_role_requirement(
        &mut self,
        id: RequirementId,
        new: NewRoleSkillRequirement,
    ) -> Result<RoleSkillRequirement, GencError> {
        self.require::<RoleSkillRequirement>(id.0)?;
        new.validate()?;
        self.require::<Skill>(new.skill_id.0)?;
        self.ensure_unique::<RoleSkillRequirement>(
            &format!("{}/{}", new.role, new.skill_id),
            Some(id.0),
            |r| r.role == new.role && r.skill_id == new.skill_id,
        )?;
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    pub fn delete_role_requirement(
        &mut self,
        id: RequirementId,
    ) -> Result<RoleSkillRequirement, GencError> {
        self.remove(id.0)
    }

    // =========================================================================
    // FEEDBACK
    // =========================================================================

    pub fn create_feedback(&mut self, new: NewGencFeedback) -> Result<GencFeedback, GencError> {
        new.validate()?;
        self.require::<Genc>(new.genc_id.0)?;
        self.require::<Mentor>(new.mentor_id.0)?;
        let id = FeedbackId(self.next_id(GencFeedback::TABLE)?);
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    pub fn feedback(&self, id: FeedbackId) -> Result<GencFeedback, GencError> {
        self.require(id.0)
    }

    pub fn feedbacks(&self, page: Page) -> Result<Vec<GencFeedback>, GencError> {
        Ok(page.apply(self.all()?))
    }

    pub fn feedback_for_genc(&self, genc: GencId) -> Result<Vec<GencFeedback>, GencError> {
        self.require::<Genc>(genc.0)?;
        self.all_where(|f: &GencFeedback| f.genc_id == genc)
    }

    pub fn update_feedback(
        &mut self,
        id: FeedbackId,
        new: NewGencFeedback,
    ) -> Result<GencFeedback, GencError> {
        self.require::<GencFeedback>(id.0)?;
        new.validate()?;
        self.require::<Genc>(new.genc_id.0)?;
        self.require::<Mentor>(new.mentor_id.0)?;
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    pub fn delete_feedback(&mut self, id: FeedbackId) -> Result<GencFeedback, GencError> {
        self.remove(id.0)
    }

    // =========================================================================
    // APPLICATION USERS
    // =========================================================================

    pub fn create_user(&mut self, new: NewApplicationUser) -> Result<ApplicationUser, GencError> {
        new.validate()?;
        self.ensure_unique::<ApplicationUser>(&new.user_assoc_id, None, |u| {
            u.user_assoc_id == new.user_assoc_id
        })?;
        let id = UserId(self.next_id(ApplicationUser::TABLE)?);
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    pub fn user(&self, id: UserId) -> Result<ApplicationUser, GencError> {
        self.require(id.0)
    }

    pub fn users(&self, page: Page) -> Result<Vec<ApplicationUser>, GencError> {
        Ok(page.apply(self.all()?))
    }

    pub fn user_by_assoc_id(&self, assoc_id: &str) -> Result<Option<ApplicationUser>, GencError> {
        self.first_where(|u: &ApplicationUser| u.user_assoc_id == assoc_id)
    }

    pub fn update_user(
        &mut self,
        id: UserId,
        new: NewApplicationUser,
    ) -> Result<ApplicationUser, GencError> {
        self.require::<ApplicationUser>(id.0)?;
        new.validate()?;
        self.ensure_unique::<ApplicationUser>(&new.user_assoc_id, Some(id.0), |u| {
            u.user_assoc_id == new.user_assoc_id
        })?;
        let record = new.into_record(id);
        self.save(&record)?;
        Ok(record)
    }

    pub fn delete_user(&mut self, id: UserId) -> Result<ApplicationUser, GencError> {
        self.remove(id.0)
    }

    // =========================================================================
    // MATRICES
    // =========================================================================

    fn skill_index(&self) -> Result<BTreeMap<SkillId, Skill>, GencError> {
        Ok(self.all::<Skill>()?.into_iter().map(|s| (s.id, s)).collect())
    }

    fn lookup_skill<'a>(
        skills: &'a BTreeMap<SkillId, Skill>,
        id: SkillId,
    ) -> Result<&'a Skill, GencError> {
        skills
            .get(&id)
            .ok_or_else(|| GencError::not_found(Skill::KIND, id))
    }

    fn requirement_entries(
        &self,
        skills: &BTreeMap<SkillId, Skill>,
    ) -> Result<Vec<RequirementEntry>, GencError> {
        self.all::<RoleSkillRequirement>()?
            .into_iter()
            .map(|r| {
                let skill = Self::lookup_skill(skills, r.skill_id)?;
                Ok(RequirementEntry {
                    role: r.role,
                    skill_name: skill.skill_name.clone(),
                    category: skill.category.clone(),
                    required_proficiency_level: r.required_proficiency_level,
                    is_mandatory: r.is_mandatory,
                })
            })
            .collect()
    }

    /// Gap report for every GenC, ordered by GenC id. Each GenC's skills are
    /// listed in the order they were recorded.
    pub fn skill_matrix(&self) -> Result<Vec<GencSkillReport>, GencError> {
        let skills = self.skill_index()?;

        let mut held: BTreeMap<GencId, Vec<HeldSkill>> = BTreeMap::new();
        for gs in self.all::<GencSkill>()? {
            let skill = Self::lookup_skill(&skills, gs.skill_id)?;
            held.entry(gs.genc_id).or_default().push(HeldSkill {
                skill_name: skill.skill_name.clone(),
                category: skill.category.clone(),
                proficiency_level: gs.proficiency_level,
                date_acquired: gs.date_acquired,
                notes: gs.notes,
            });
        }

        let profiles: Vec<GencProfile> = self
            .all::<Genc>()?
            .into_iter()
            .map(|g| GencProfile {
                skills: held.remove(&g.id).unwrap_or_default(),
                associate_id: g.associate_id,
                genc_name: g.genc_name,
                current_designation: g.current_designation,
            })
            .collect();

        let requirements = self.requirement_entries(&skills)?;
        Ok(build_skill_matrix(&profiles, &requirements))
    }

    /// Requirements grouped by role.
    pub fn role_requirements_matrix(&self) -> Result<Vec<RoleRequirements>, GencError> {
        let skills = self.skill_index()?;
        let requirements = self.requirement_entries(&skills)?;
        Ok(build_role_requirements_matrix(&requirements))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::types::{Location, MentorDesignation, ProficiencyLevel};
    use chrono::NaiveDate;

    struct Fixture {
        tracker: Tracker,
        account: AccountId,
        line: ServiceLineId,
        mentor: MentorId,
    }

    fn fixture() -> Fixture {
        let mut tracker = Tracker::new();
        let account = tracker
            .create_account(NewAccount {
                account_name: "Contoso".to_string(),
                epl_name: "Meera".to_string(),
                edp_name: "Arjun".to_string(),
            })
            .unwrap()
            .id;
        let line = tracker
            .create_service_line(NewServiceLine {
                account_id: account,
                service_line: "Digital".to_string(),
                edl_name: "Kiran".to_string(),
                pdl_name: "Latha".to_string(),
                sl_spoc: "Nikhil".to_string(),
            })
            .unwrap()
            .id;
        let mentor = tracker
            .create_mentor(NewMentor {
                associate_id: "M100".to_string(),
                mentor_name: "Priya".to_string(),
                designation: MentorDesignation::Sm,
                service_line: "Digital".to_string(),
            })
            .unwrap()
            .id;
        Fixture {
            tracker,
            account,
            line,
            mentor,
        }
    }

    fn new_genc(f: &Fixture, associate_id: &str) -> NewGenc {
        NewGenc {
            associate_id: associate_id.to_string(),
            genc_name: format!("GenC {associate_id}"),
            account_id: f.account,
            service_line_id: f.line,
            mentor_id: f.mentor,
            status: Status::Idle,
            date_of_joining: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            date_of_allocation: None,
            allocation_project: None,
            team_name: None,
            location: Location::Chennai,
            current_designation: Designation::Pat,
            planned_billing_start_date: None,
            actual_billing_start_date: None,
        }
    }

    fn add_genc(f: &mut Fixture, associate_id: &str) -> Genc {
        let new = new_genc(f, associate_id);
        f.tracker.create_genc(new).unwrap()
    }

    fn skill(t: &mut Tracker, name: &str) -> SkillId {
        t.create_skill(NewSkill {
            skill_name: name.to_string(),
            description: None,
            category: Some("Programming".to_string()),
        })
        .unwrap()
        .id
    }

    #[test]
    fn ids_are_assigned_sequentially() {
        let mut f = fixture();
        let a = add_genc(&mut f, "1");
        let b = add_genc(&mut f, "2");
        assert_eq!(a.id, GencId(1));
        assert_eq!(b.id, GencId(2));
    }

    #[test]
    fn duplicate_associate_id_rejected() {
        let mut f = fixture();
        add_genc(&mut f, "1");
        let again = new_genc(&f, "1");
        let err = f.tracker.create_genc(again);
        assert!(matches!(err, Err(GencError::AlreadyExists { entity: "GenC", .. })));
    }

    #[test]
    fn illegal_update_leaves_record_untouched() {
        let mut f = fixture();
        let genc = add_genc(&mut f, "1");

        let mut update = NewGenc::from(&genc);
        update.status = Status::BillingStarted;
        update.team_name = Some("Falcon".to_string());
        let err = f.tracker.update_genc(genc.id, update);

        assert!(matches!(err, Err(GencError::InvalidTransition { .. })));
        assert_eq!(f.tracker.genc(genc.id).unwrap(), genc);
    }

    #[test]
    fn legal_update_persists_all_fields() {
        let mut f = fixture();
        let genc = add_genc(&mut f, "1");

        let mut update = NewGenc::from(&genc);
        update.status = Status::UnderProjectTraining;
        update.team_name = Some("Falcon".to_string());
        let saved = f.tracker.update_genc(genc.id, update).unwrap();

        assert_eq!(saved.status, Status::UnderProjectTraining);
        assert_eq!(f.tracker.genc(genc.id).unwrap().team_name.as_deref(), Some("Falcon"));
    }

    #[test]
    fn transition_status_walks_the_table() {
        let mut f = fixture();
        let id = add_genc(&mut f, "1").id;

        f.tracker.transition_status(id, Status::CustomerOnboarded).unwrap();
        f.tracker.transition_status(id, Status::BillingPlanned).unwrap();
        assert!(f.tracker.transition_status(id, Status::Idle).is_err());
        assert_eq!(f.tracker.genc(id).unwrap().status, Status::BillingPlanned);
    }

    #[test]
    fn service_line_must_belong_to_account() {
        let mut f = fixture();
        let other = f
            .tracker
            .create_account(NewAccount {
                account_name: "Fabrikam".to_string(),
                epl_name: "A".to_string(),
                edp_name: "B".to_string(),
            })
            .unwrap()
            .id;
        let mut new = new_genc(&f, "1");
        new.account_id = other;
        let err = f.tracker.create_genc(new);
        assert!(matches!(
            err,
            Err(GencError::InvalidField {
                field: "service_line_id",
                ..
            })
        ));
    }

    #[test]
    fn missing_mentor_is_not_found() {
        let mut f = fixture();
        let mut new = new_genc(&f, "1");
        new.mentor_id = MentorId(99);
        assert!(matches!(
            f.tracker.create_genc(new),
            Err(GencError::NotFound { entity: "Mentor", .. })
        ));
    }

    #[test]
    fn genc_skill_upsert_keeps_identifier() {
        let mut f = fixture();
        let genc = add_genc(&mut f, "1").id;
        let python = skill(&mut f.tracker, "Python");

        let first = f
            .tracker
            .add_genc_skill(NewGencSkill {
                genc_id: genc,
                skill_id: python,
                proficiency_level: ProficiencyLevel::Beginner,
                date_acquired: None,
                notes: None,
            })
            .unwrap();
        let second = f
            .tracker
            .add_genc_skill(NewGencSkill {
                genc_id: genc,
                skill_id: python,
                proficiency_level: ProficiencyLevel::Advanced,
                date_acquired: None,
                notes: Some("certified".to_string()),
            })
            .unwrap();

        assert_eq!(first.id, second.id);
        let held = f.tracker.skills_for_genc(genc).unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].proficiency_level, ProficiencyLevel::Advanced);
    }

    #[test]
    fn requirement_update_cannot_collide() {
        let mut f = fixture();
        let python = skill(&mut f.tracker, "Python");
        let sql = skill(&mut f.tracker, "SQL");
        let req = |skill_id| NewRoleSkillRequirement {
            role: Designation::Pa,
            skill_id,
            required_proficiency_level: ProficiencyLevel::Intermediate,
            is_mandatory: true,
        };
        f.tracker.set_role_requirement(req(python)).unwrap();
        let on_sql = f.tracker.set_role_requirement(req(sql)).unwrap();

        let err = f.tracker.update_role_requirement(on_sql.id, req(python));
        assert!(matches!(err, Err(GencError::AlreadyExists { .. })));
    }

    #[test]
    fn requirement_set_twice_overwrites_in_place() {
        let mut f = fixture();
        let python = skill(&mut f.tracker, "Python");

        let first = f
            .tracker
            .set_role_requirement(NewRoleSkillRequirement {
                role: Designation::Pa,
                skill_id: python,
                required_proficiency_level: ProficiencyLevel::Intermediate,
                is_mandatory: true,
            })
            .unwrap();
        let second = f
            .tracker
            .set_role_requirement(NewRoleSkillRequirement {
                role: Designation::Pa,
                skill_id: python,
                required_proficiency_level: ProficiencyLevel::Expert,
                is_mandatory: false,
            })
            .unwrap();

        assert_eq!(first.id, second.id);
        let stored = f.tracker.role_requirement(first.id).unwrap();
        assert_eq!(stored.required_proficiency_level, ProficiencyLevel::Expert);
        assert!(!stored.is_mandatory);
        assert_eq!(f.tracker.counts().unwrap().role_requirements, 1);
    }

    #[test]
    fn deleting_genc_cascades() {
        let mut f = fixture();
        let genc = add_genc(&mut f, "1").id;
        let keep = add_genc(&mut f, "2").id;
        let python = skill(&mut f.tracker, "Python");
        for g in [genc, keep] {
            f.tracker
                .add_genc_skill(NewGencSkill {
                    genc_id: g,
                    skill_id: python,
                    proficiency_level: ProficiencyLevel::Beginner,
                    date_acquired: None,
                    notes: None,
                })
                .unwrap();
        }
        f.tracker
            .create_feedback(NewGencFeedback {
                genc_id: genc,
                mentor_id: f.mentor,
                date_of_feedback: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
                feedback: "Solid start".to_string(),
            })
            .unwrap();

        f.tracker.delete_genc(genc).unwrap();

        let counts = f.tracker.counts().unwrap();
        assert_eq!(counts.gencs, 1);
        assert_eq!(counts.genc_skills, 1);
        assert_eq!(counts.feedbacks, 0);
        assert!(matches!(f.tracker.genc(genc), Err(GencError::NotFound { .. })));
    }

    #[test]
    fn deleting_skill_cascades() {
        let mut f = fixture();
        let genc = add_genc(&mut f, "1").id;
        let python = skill(&mut f.tracker, "Python");
        f.tracker
            .add_genc_skill(NewGencSkill {
                genc_id: genc,
                skill_id: python,
                proficiency_level: ProficiencyLevel::Expert,
                date_acquired: None,
                notes: None,
            })
            .unwrap();
        f.tracker
            .set_role_requirement(NewRoleSkillRequirement {
                role: Designation::Pat,
                skill_id: python,
                required_proficiency_level: ProficiencyLevel::Beginner,
                is_mandatory: true,
            })
            .unwrap();

        f.tracker.delete_skill(python).unwrap();

        let counts = f.tracker.counts().unwrap();
        assert_eq!((counts.skills, counts.genc_skills, counts.role_requirements), (0, 0, 0));
        assert!(f.tracker.skill_matrix().is_ok());
    }

    #[test]
    fn referenced_mentor_cannot_be_deleted() {
        let mut f = fixture();
        add_genc(&mut f, "1");
        let err = f.tracker.delete_mentor(f.mentor);
        assert!(matches!(err, Err(GencError::InUse { entity: "Mentor", .. })));
        assert!(f.tracker.mentor(f.mentor).is_ok());
    }

    #[test]
    fn status_counts_cover_every_status() {
        let mut f = fixture();
        add_genc(&mut f, "1");
        let counts = f.tracker.status_counts().unwrap();
        assert_eq!(counts.len(), Status::ALL.len());
        assert_eq!(counts[&Status::Idle], 1);
        assert_eq!(counts[&Status::BillingStarted], 0);
    }

    #[test]
    fn matrix_reflects_stored_records() {
        let mut f = fixture();
        let genc = add_genc(&mut f, "1").id;
        let python = skill(&mut f.tracker, "Python");
        let sql = skill(&mut f.tracker, "SQL");
        f.tracker
            .add_genc_skill(NewGencSkill {
                genc_id: genc,
                skill_id: python,
                proficiency_level: ProficiencyLevel::Beginner,
                date_acquired: None,
                notes: None,
            })
            .unwrap();
        for (skill_id, level) in [
            (python, ProficiencyLevel::Advanced),
            (sql, ProficiencyLevel::Intermediate),
        ] {
            f.tracker
                .set_role_requirement(NewRoleSkillRequirement {
                    role: Designation::Pat,
                    skill_id,
                    required_proficiency_level: level,
                    is_mandatory: true,
                })
                .unwrap();
        }

        let matrix = f.tracker.skill_matrix().unwrap();
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix[0].skill_gaps_count, 2);
        assert_eq!(matrix[0].missing_mandatory_skills[0].skill_name, "SQL");

        let roles = f.tracker.role_requirements_matrix().unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].role, Designation::Pat);
        assert_eq!(roles[0].requirements.len(), 2);
    }
}
