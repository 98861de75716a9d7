//! # Configuration
//!
//! Settings come from three places, later ones winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`--config`, or `genc.toml` in the working directory)
//! 3. environment variables (`GENC_CORS_ORIGINS`, `GENC_RATE_LIMIT`)
//!
//! CLI flags are applied on top by the command layer. The API key is
//! deliberately env-only (`GENC_API_KEY`) so it never sits in a config file.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! cors_origins = "http://localhost:3000"
//! rate_limit = 50
//!
//! [storage]
//! backend = "redb"
//! path = "genc.redb"
//! ```

use genc_core::GencError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "genc.toml";

/// Default requests per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Largest config file we are willing to parse (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated origins, or `*`. `None` means localhost only.
    pub cors_origins: Option<String>,
    /// Requests per second; 0 disables limiting.
    pub rate_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: None,
            rate_limit: DEFAULT_RATE_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Defaults overlaid with the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay `GENC_CORS_ORIGINS` and `GENC_RATE_LIMIT` if set.
    ///
    /// An unparsable rate limit is ignored with a warning.
    pub fn apply_env(&mut self) {
        if let Ok(origins) = std::env::var("GENC_CORS_ORIGINS") {
            self.cors_origins = Some(origins);
        }
        if let Ok(raw) = std::env::var("GENC_RATE_LIMIT") {
            match raw.trim().parse() {
                Ok(rps) => self.rate_limit = rps,
                Err(e) => tracing::warn!("Ignoring GENC_RATE_LIMIT='{}': {}", raw, e),
            }
        }
    }

    /// `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// `redb` (persistent) or `memory` (volatile).
    pub backend: String,
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "redb".to_string(),
            path: PathBuf::from("genc.redb"),
        }
    }
}

// =============================================================================
// FULL CONFIG
// =============================================================================

/// The whole configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

impl TrackerConfig {
    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, GencError> {
        toml::from_str(text).map_err(|e| GencError::DeserializationError(format!("config: {}", e)))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `genc.toml` is used if it
    /// is present and defaults otherwise. Environment overrides are applied
    /// in both cases.
    pub fn load(explicit: Option<&Path>) -> Result<Self, GencError> {
        let mut config = match explicit {
            Some(path) => Self::read(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::read(fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.server.apply_env();
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, GencError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            GencError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(GencError::IoError(format!(
                "Config '{}' is {} bytes, limit is {}",
                path.display(),
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            GencError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Self::from_toml(&text)
    }
}

// =============================================================================
// TESTS
// =============================================================================
