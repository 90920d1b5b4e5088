//! Runtime configuration for the reconciliation engine.
//!
//! Configuration is read from a TOML file. Every field has a default, so a
//! missing file or a partial file both produce a usable configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default container image for the gateway service.
pub const DEFAULT_GATEWAY_IMAGE: &str = "ghcr.io/agentgateway/agentgateway:latest";

/// Default port the gateway listens on.
pub const DEFAULT_GATEWAY_PORT: u16 = 21212;

/// Default namespace for cluster resources.
pub const DEFAULT_NAMESPACE: &str = "kagent";

/// Default compose project name.
pub const DEFAULT_COMPOSE_PROJECT: &str = "agentregistry";

/// Settings consumed by translators, the reconciler and runtime adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Directory holding the compose file, gateway config and agent side files.
    pub runtime_dir: PathBuf,
    /// Compose project name passed to the container runtime.
    pub compose_project: String,
    /// Program and leading arguments used to invoke compose.
    pub compose_command: Vec<String>,
    /// Gateway container image.
    pub gateway_image: String,
    /// Port published by the gateway service.
    pub gateway_port: u16,
    /// Namespace used for cluster resources without an explicit override.
    pub default_namespace: String,
    /// Upper bound for a single compose invocation, in seconds.
    pub apply_timeout_secs: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            runtime_dir: PathBuf::from(".agentregistry/runtime"),
            compose_project: DEFAULT_COMPOSE_PROJECT.to_owned(),
            compose_command: vec!["docker".to_owned(), "compose".to_owned()],
            gateway_image: DEFAULT_GATEWAY_IMAGE.to_owned(),
            gateway_port: DEFAULT_GATEWAY_PORT,
            default_namespace: DEFAULT_NAMESPACE.to_owned(),
            apply_timeout_secs: None,
        }
    }
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    ///
    /// A missing file yields [`RuntimeConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or
    /// when the parsed values are invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.to_path_buf(),
            source: err,
        })?;
        Self::from_toml(&raw)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the runtime directory.
    #[must_use]
    pub fn with_runtime_dir(mut self, runtime_dir: impl Into<PathBuf>) -> Self {
        self.runtime_dir = runtime_dir.into();
        self
    }

    /// Returns the compose apply timeout, when one is configured.
    #[must_use]
    pub fn apply_timeout(&self) -> Option<Duration> {
        self.apply_timeout_secs.map(Duration::from_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.compose_command.is_empty() {
            return Err(ConfigError::Invalid(
                "compose_command must name a program".to_owned(),
            ));
        }
        if self.compose_project.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "compose_project must not be empty".to_owned(),
            ));
        }
        if self.default_namespace.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_namespace must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Errors returned while loading runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}
