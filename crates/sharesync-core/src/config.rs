//! Configuration module for ShareSync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{endpoint::EndpointConfig, options::SyncOptions};

/// Capacity of the in-memory audit log unless configured otherwise.
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// Number of log entries returned by a tail query unless configured otherwise.
pub const DEFAULT_LOG_TAIL: usize = 100;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for ShareSync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default options merged under every start request.
    pub sync: SyncOptions,
    pub logging: LoggingConfig,
    pub connect: ConnectConfig,
    pub mirror: MirrorConfig,
    pub endpoints: EndpointsConfig,
}

/// Logging and audit-buffer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Tracing level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Maximum number of entries kept in the audit log.
    pub buffer_capacity: usize,
    /// Number of entries returned by a default tail query.
    pub tail_default: usize,
}

/// Endpoint connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectConfig {
    /// Seconds to wait for a connector handshake before giving up.
    pub timeout_secs: u64,
}

/// External mirroring tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Path or name of the `lftp` executable.
    pub lftp_binary: String,
    /// Directory on the transfer endpoint that mirrors the share root.
    pub remote_root: String,
    /// Tools reported in the `system_requirements` diagnostic.
    pub requirements: Vec<String>,
}

/// Endpoint parameters used by the command-line front end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub share: Option<EndpointConfig>,
    pub transfer: Option<EndpointConfig>,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/sharesync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("sharesync")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            buffer_capacity: DEFAULT_LOG_CAPACITY,
            tail_default: DEFAULT_LOG_TAIL,
        }
    }
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            lftp_binary: "lftp".to_string(),
            remote_root: "/".to_string(),
            requirements: ["smbclient", "cifs-utils", "rsync", "lftp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"connect.timeout_secs"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }
        if self.logging.buffer_capacity == 0 {
            errors.push(ValidationError {
                field: "logging.buffer_capacity".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.logging.tail_default == 0 {
            errors.push(ValidationError {
                field: "logging.tail_default".into(),
                message: "must be greater than 0".into(),
            });
        } else if self.logging.tail_default > self.logging.buffer_capacity {
            errors.push(ValidationError {
                field: "logging.tail_default".into(),
                message: format!(
                    "tail_default ({}) must not exceed buffer_capacity ({})",
                    self.logging.tail_default, self.logging.buffer_capacity
                ),
            });
        }

        // --- connect ---
        if self.connect.timeout_secs == 0 {
            errors.push(ValidationError {
                field: "connect.timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- mirror ---
        if self.mirror.lftp_binary.trim().is_empty() {
            errors.push(ValidationError {
                field: "mirror.lftp_binary".into(),
                message: "must not be empty".into(),
            });
        }
        if self.mirror.remote_root.trim().is_empty() {
            errors.push(ValidationError {
                field: "mirror.remote_root".into(),
                message: "must not be empty".into(),
            });
        }

        // --- endpoints ---
        for (field, endpoint) in [
            ("endpoints.share", &self.endpoints.share),
            ("endpoints.transfer", &self.endpoints.transfer),
        ] {
            if endpoint.as_ref().is_some_and(EndpointConfig::is_empty) {
                errors.push(ValidationError {
                    field: field.into(),
                    message: "must contain at least one parameter".into(),
                });
            }
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use sharesync_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .sync_bidirectional(false)
///     .connect_timeout_secs(10)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- sync ---

    pub fn sync_bidirectional(mut self, value: bool) -> Self {
        self.config.sync.bidirectional = value;
        self
    }

    pub fn sync_delete_extraneous(mut self, value: bool) -> Self {
        self.config.sync.delete_extraneous = value;
        self
    }

    pub fn sync_preserve_attributes(mut self, value: bool) -> Self {
        self.config.sync.preserve_attributes = value;
        self
    }

    pub fn sync_compress(mut self, value: bool) -> Self {
        self.config.sync.compress = value;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.logging.buffer_capacity = capacity;
        self
    }

    pub fn logging_tail_default(mut self, n: usize) -> Self {
        self.config.logging.tail_default = n;
        self
    }

    // --- connect ---

    pub fn connect_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.connect.timeout_secs = seconds;
        self
    }

    // --- mirror ---

    pub fn mirror_lftp_binary(mut self, binary: impl Into<String>) -> Self {
        self.config.mirror.lftp_binary = binary.into();
        self
    }

    pub fn mirror_remote_root(mut self, root: impl Into<String>) -> Self {
        self.config.mirror.remote_root = root.into();
        self
    }

    pub fn mirror_requirements(mut self, tools: Vec<String>) -> Self {
        self.config.mirror.requirements = tools;
        self
    }

    // --- endpoints ---

    pub fn share_endpoint(mut self, endpoint: EndpointConfig) -> Self {
        self.config.endpoints.share = Some(endpoint);
        self
    }

    pub fn transfer_endpoint(mut self, endpoint: EndpointConfig) -> Self {
        self.config.endpoints.transfer = Some(endpoint);
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
