//! # CLI Command Implementations

use crate::api;
use crate::config::TrackerConfig;
use genc_core::{
    GencError, ImportReport, SeedBundle, Status, Tracker, allowed_successors,
    is_transition_allowed, summarize, transition_table, validate_transition,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE HELPERS
// =============================================================================

/// Maximum seed bundle size (50 MB).
const MAX_BUNDLE_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Canonicalize an input path and make sure it names a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, GencError> {
    let canonical = path.canonicalize().map_err(|e| {
        GencError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(GencError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

fn validate_file_size(path: &Path, max_size: u64) -> Result<(), GencError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| GencError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(GencError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Read and parse a seed bundle.
pub fn read_bundle(path: &Path) -> Result<SeedBundle, GencError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_BUNDLE_FILE_SIZE)?;
    let text = std::fs::read_to_string(&path)
        .map_err(|e| GencError::IoError(format!("Read bundle: {}", e)))?;
    SeedBundle::from_json(&text)
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server, optionally importing a bundle first.
pub async fn cmd_server(config: &TrackerConfig, seed: Option<&Path>) -> Result<(), GencError> {
    let mut tracker = open_tracker(config)?;

    if let Some(seed) = seed {
        let report = tracker.import_seed(read_bundle(seed)?)?;
        tracing::info!(
            created = report.created,
            skipped = report.skipped,
            "Seed bundle imported"
        );
    }

    println!("GenC Tracker Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Address:  {}", config.server.bind_addr());
    println!("  Backend:  {}", tracker.backend_name());
    if tracker.is_persistent() {
        println!("  Database: {:?}", config.storage.path);
    }
    println!();
    println!("Endpoints:");
    println!("  GET  /skill-matrix             - Skill gap report");
    println!("  GET  /role-requirements-matrix - Requirements by role");
    println!("  POST /gencs/{{id}}/status        - Change a GenC's status");
    println!("  GET  /enums/status-transitions - Lifecycle table");
    println!("  GET  /status                   - Tracker status");
    println!("  GET  /health                   - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(&config.server, tracker).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show record counts, GenCs per status and matrix totals.
pub fn cmd_status(config: &TrackerConfig, json_mode: bool) -> Result<(), GencError> {
    let tracker = open_tracker(config)?;
    let counts = tracker.counts()?;
    let by_status = tracker.status_counts()?;
    let summary = summarize(&tracker.skill_matrix()?);

    if json_mode {
        print_json(&api::StatusResponse {
            backend: tracker.backend_name().to_string(),
            counts,
            gencs_by_status: api::StatusResponse::label_counts(by_status),
            matrix: summary,
        });
        return Ok(());
    }

    println!("GenC Tracker Status");
    println!("===================");
    println!("Backend:  {}", tracker.backend_name());
    if tracker.is_persistent() {
        println!("Database: {:?}", config.storage.path);
    }
    println!();
    println!("Accounts:           {}", counts.accounts);
    println!("Service lines:      {}", counts.service_lines);
    println!("Mentors:            {}", counts.mentors);
    println!("Skills:             {}", counts.skills);
    println!("GenCs:              {}", counts.gencs);
    println!("GenC skills:        {}", counts.genc_skills);
    println!("Role requirements:  {}", counts.role_requirements);
    println!("Feedback entries:   {}", counts.feedbacks);
    println!("Application users:  {}", counts.users);
    println!();
    println!("GenCs by status:");
    for (status, n) in &by_status {
        println!("  {:<24} {}", status.label(), n);
    }
    println!();
    println!(
        "Skill matrix: {} compliant, {} with gaps ({} gaps, {} missing mandatory)",
        summary.compliant_count,
        summary.with_gaps_count,
        summary.total_gaps,
        summary.missing_mandatory_total
    );

    Ok(())
}

// =============================================================================
// MATRIX COMMANDS
// =============================================================================

/// Print the skill gap matrix.
pub fn cmd_matrix(config: &TrackerConfig, json_mode: bool, gaps_only: bool) -> Result<(), GencError> {
    let tracker = open_tracker(config)?;
    let mut reports = tracker.skill_matrix()?;
    if gaps_only {
        reports.retain(|r| !r.is_compliant());
    }

    if json_mode {
        print_json(&reports);
        return Ok(());
    }

    if reports.is_empty() {
        println!("No GenCs to report.");
        return Ok(());
    }

    for report in &reports {
        println!(
            "{} {} [{}] - {} gap(s)",
            report.associate_id,
            report.genc_name,
            report.current_designation,
            report.skill_gaps_count
        );
        for skill in &report.skills {
            let bar = match skill.required_proficiency_level {
                Some(required) => format!("needs {}", required),
                None => "no requirement".to_string(),
            };
            let mark = if skill.meets_requirement { "ok " } else { "GAP" };
            println!(
                "  {} {:<28} {:<12} ({})",
                mark, skill.skill_name, skill.proficiency_level, bar
            );
        }
        for missing in &report.missing_mandatory_skills {
            println!(
                "  MISSING {:<24} needs {}",
                missing.skill_name, missing.required_proficiency_level
            );
        }
    }

    Ok(())
}

/// Print requirements grouped by role.
pub fn cmd_roles(config: &TrackerConfig, json_mode: bool) -> Result<(), GencError> {
    let tracker = open_tracker(config)?;
    let roles = tracker.role_requirements_matrix()?;

    if json_mode {
        print_json(&roles);
        return Ok(());
    }

    if roles.is_empty() {
        println!("No role requirements defined.");
        return Ok(());
    }

    for group in &roles {
        println!("{}:", group.role);
        for line in &group.requirements {
            println!(
                "  {:<28} {:<12} {}",
                line.skill_name,
                line.required_proficiency_level,
                if line.is_mandatory { "mandatory" } else { "optional" }
            );
        }
    }

    Ok(())
}

// =============================================================================
// LIFECYCLE COMMANDS
// =============================================================================

/// Print the status lifecycle table.
pub fn cmd_transitions(json_mode: bool) -> Result<(), GencError> {
    let table = transition_table();

    if json_mode {
        let labelled: serde_json::Map<String, serde_json::Value> = table
            .iter()
            .map(|(status, next)| {
                let labels = next.iter().map(|s| serde_json::Value::from(s.label()));
                (status.label().to_string(), labels.collect())
            })
            .collect();
        print_json(&labelled);
        return Ok(());
    }

    for (status, next) in &table {
        if next.is_empty() {
            println!("{:<24} (terminal)", status.label());
        } else {
            let labels: Vec<&str> = next.iter().map(|s| s.label()).collect();
            println!("{:<24} -> {}", status.label(), labels.join(", "));
        }
    }

    Ok(())
}

/// Check whether `from -> to` is allowed.
///
/// A disallowed move is reported, not treated as a command failure.
pub fn cmd_check_transition(from: Status, to: Status, json_mode: bool) -> Result<(), GencError> {
    let verdict = validate_transition(from, to);

    if json_mode {
        print_json(&api::TransitionCheckResponse {
            current: from,
            proposed: to,
            allowed: is_transition_allowed(from, to),
            allowed_next: std::iter::once(from)
                .chain(allowed_successors(from).iter().copied())
                .collect(),
            detail: verdict.err().map(|e| e.to_string()),
        });
        return Ok(());
    }

    match verdict {
        Ok(()) => println!("Allowed: {} -> {}", from, to),
        Err(e) => println!("Not allowed: {}", e),
    }
    Ok(())
}

// =============================================================================
// IMPORT COMMAND
// =============================================================================

/// Import a seed bundle.
pub fn cmd_import(config: &TrackerConfig, json_mode: bool, file: &Path) -> Result<(), GencError> {
    let bundle = read_bundle(file)?;
    let mut tracker = open_tracker(config)?;
    if !tracker.is_persistent() {
        tracing::warn!("Importing into the memory backend; nothing will be kept after exit");
    }

    let report: ImportReport = tracker.import_seed(bundle)?;

    if json_mode {
        print_json(&report);
    } else {
        println!(
            "Imported {} record(s), skipped {} already present",
            report.created, report.skipped
        );
    }
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new empty database.
pub fn cmd_init(config: &TrackerConfig, force: bool) -> Result<(), GencError> {
    let path = &config.storage.path;
    if config.storage.backend != "redb" {
        return Err(GencError::invalid(
            "backend",
            "init only applies to the redb backend",
        ));
    }

    if path.exists() {
        if !force {
            return Err(GencError::IoError(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(path)
            .map_err(|e| GencError::IoError(format!("Remove {:?}: {}", path, e)))?;
    }

    let _tracker = Tracker::with_redb(path)?;
    println!("Initialized new redb database at {:?}", path);
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Open the tracker named by the storage configuration.
pub fn open_tracker(config: &TrackerConfig) -> Result<Tracker, GencError> {
    match config.storage.backend.as_str() {
        "redb" => Tracker::with_redb(&config.storage.path),
        "memory" => Ok(Tracker::new()),
        other => Err(GencError::invalid(
            "backend",
            format!("unknown backend '{}', expected \"redb\" or \"memory\"", other),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn redb_config(dir: &tempfile::TempDir) -> TrackerConfig {
        let mut config = TrackerConfig::default();
        config.storage.path = dir.path().join("tracker.redb");
        config
    }

    #[test]
    fn unknown_backend_rejected() {
        let mut config = TrackerConfig::default();
        config.storage.backend = "sqlite".to_string();
        assert!(matches!(
            open_tracker(&config),
            Err(GencError::InvalidField { field: "backend", .. })
        ));
    }

    #[test]
    fn init_refuses_existing_database_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let config = redb_config(&dir);

        cmd_init(&config, false).unwrap();
        assert!(config.storage.path.exists());
        assert!(cmd_init(&config, false).is_err());
        cmd_init(&config, true).unwrap();
    }

    #[test]
    fn import_then_status_on_redb() {
        let dir = tempfile::tempdir().unwrap();
        let config = redb_config(&dir);
        let bundle = dir.path().join("bundle.json");
        std::fs::write(
            &bundle,
            r#"{"skills":[{"skill_name":"Rust","category":"Languages"}],
                "accounts":[{"account_name":"Acme","epl_name":"E","edp_name":"D"}]}"#,
        )
        .unwrap();

        cmd_import(&config, true, &bundle).unwrap();
        // Second run only skips.
        cmd_import(&config, true, &bundle).unwrap();

        let tracker = open_tracker(&config).unwrap();
        let counts = tracker.counts().unwrap();
        assert_eq!(counts.skills, 1);
        assert_eq!(counts.accounts, 1);
    }

    #[test]
    fn bundle_must_be_a_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_bundle(dir.path()).is_err());
        assert!(read_bundle(&dir.path().join("missing.json")).is_err());
    }
}
