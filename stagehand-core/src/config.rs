//! Session configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, StagehandError};

/// Top-level stagehand configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StagehandConfig {
    /// Engine process settings.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Evaluation platform settings.
    #[serde(default)]
    pub platform: PlatformConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Session behavior settings.
    #[serde(default)]
    pub session: SessionConfig,
}

impl StagehandConfig {
    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// [`StagehandError::Config`] when the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| StagehandError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// I/O errors, plus parse errors as in [`StagehandConfig::from_toml`].
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// How to reach the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Command to spawn the engine process. When absent, the session
    /// expects to be wired to the engine over its own stdin/stdout.
    #[serde(default)]
    pub command: Option<String>,
    /// Arguments for the engine process.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Where the evaluation platform lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Base URL of the platform API.
    #[serde(default = "default_platform_url")]
    pub base_url: String,
    /// Disable to skip the platform entirely (no probe, no messages).
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: default_platform_url(),
            enabled: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory log files are written to.
    #[serde(default = "default_log_dir")]
    pub directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: default_log_dir(),
        }
    }
}

/// Session behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Wait for the engine's acknowledgment of every dispatched action.
    /// Debug runs against no engine set this to `false`.
    #[serde(default = "default_true")]
    pub wait_for_acks: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            wait_for_acks: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_platform_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
