//! # GenC Tracker
//!
//! The main binary for the GenC onboarding tracker.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for reports, lifecycle checks and bundle import
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │              apps/genc-tracker (THE BINARY)          │
//! │                                                      │
//! │   ┌─────────────┐   ┌─────────────┐   ┌──────────┐   │
//! │   │    CLI      │   │  HTTP API   │   │  Config  │   │
//! │   │   (clap)    │   │   (axum)    │   │  (toml)  │   │
//! │   └──────┬──────┘   └──────┬──────┘   └────┬─────┘   │
//! │          └─────────────────┼───────────────┘         │
//! │                            ▼                         │
//! │                    ┌───────────────┐                 │
//! │                    │   genc-core   │                 │
//! │                    │  (THE LOGIC)  │                 │
//! │                    └───────────────┘                 │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! genc-tracker server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! genc-tracker import -f bundle.json
//! genc-tracker matrix --gaps-only
//! genc-tracker check-transition --from Idle --to "Billing Started"
//! ```

use clap::Parser;
use genc_tracker::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // GENC_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("GENC_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "genc_tracker=debug,genc_core=debug,tower_http=debug"
    } else {
        "genc_tracker=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
   ____            ____   _____               _
  / ___| ___ _ __ / ___| |_   _| __ __ _  ___| | _____ _ __
 | |  _ / _ \ '_ \ |       | || '__/ _` |/ __| |/ / _ \ '__|
 | |_| |  __/ | | | |___   | || | | (_| | (__|   <  __/ |
  \____|\___|_| |_|\____|  |_||_|  \__,_|\___|_|\_\___|_|

  GenC Tracker v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
