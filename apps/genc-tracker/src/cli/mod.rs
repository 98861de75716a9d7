//! # GenC Tracker CLI Module
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show record counts and matrix totals
//! - `matrix` - Print the skill gap matrix
//! - `roles` - Print requirements grouped by role
//! - `transitions` - Print the status lifecycle table
//! - `check-transition` - Check a single status change
//! - `import` - Load a JSON seed bundle
//! - `init` - Initialize a new database

mod commands;

use crate::config::TrackerConfig;
use clap::{Parser, Subcommand};
use genc_core::{GencError, Status};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// GenC Tracker
///
/// Tracks GenC trainees through their status lifecycle and reports skill
/// gaps against the requirements of their role.
#[derive(Parser, Debug)]
#[command(name = "genc-tracker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the tracker database (overrides `[storage] path`)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend: "redb" (persistent) or "memory" (overrides `[storage] backend`)
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<String>,

    /// Configuration file (default: ./genc.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides `[server] host`)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides `[server] port`)
        #[arg(short, long)]
        port: Option<u16>,

        /// Seed bundle to import before serving
        #[arg(short, long)]
        seed: Option<PathBuf>,
    },

    /// Show record counts, GenCs per status and matrix totals
    Status,

    /// Print the skill gap matrix
    Matrix {
        /// Only list GenCs with at least one gap
        #[arg(short, long)]
        gaps_only: bool,
    },

    /// Print requirements grouped by role
    Roles,

    /// Print the status lifecycle table
    Transitions,

    /// Check whether a status change is allowed
    CheckTransition {
        /// Current status (label or key, e.g. "Idle" or IDLE)
        #[arg(short, long)]
        from: Status,

        /// Proposed status
        #[arg(short, long)]
        to: Status,
    },

    /// Import a JSON seed bundle
    Import {
        /// Path to the bundle
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Initialize a new empty database
    Init {
        /// Replace an existing database
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

impl Cli {
    /// Configuration with global flags applied on top.
    pub fn resolve_config(&self) -> Result<TrackerConfig, GencError> {
        let mut config = TrackerConfig::load(self.config.as_deref())?;
        if let Some(database) = &self.database {
            config.storage.path.clone_from(database);
        }
        if let Some(backend) = &self.backend {
            config.storage.backend.clone_from(backend);
        }
        Ok(config)
    }
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), GencError> {
    let mut config = cli.resolve_config()?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port, seed }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cmd_server(&config, seed.as_deref()).await
        }
        Some(Commands::Status) | None => cmd_status(&config, json_mode),
        Some(Commands::Matrix { gaps_only }) => cmd_matrix(&config, json_mode, gaps_only),
        Some(Commands::Roles) => cmd_roles(&config, json_mode),
        Some(Commands::Transitions) => cmd_transitions(json_mode),
        Some(Commands::CheckTransition { from, to }) => cmd_check_transition(from, to, json_mode),
        Some(Commands::Import { file }) => cmd_import(&config, json_mode, &file),
        Some(Commands::Init { force }) => cmd_init(&config, force),
    }
}
