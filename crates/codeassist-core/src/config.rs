//! Configuration management for codeassist.
//!
//! Loads configuration from ${CODEASSIST_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::prompts::DEFAULT_SYSTEM_INSTRUCTION;

/// Returns the default config template with comments.
///
/// Embedded from `default_config.toml` at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for codeassist configuration and log directories.
    //!
    //! CODEASSIST_HOME resolution order:
    //! 1. CODEASSIST_HOME environment variable (if set)
    //! 2. ~/.config/codeassist (default)

    use std::path::PathBuf;

    /// Returns the codeassist home directory.
    pub fn codeassist_home() -> PathBuf {
        if let Ok(home) = std::env::var("CODEASSIST_HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map_or_else(|| PathBuf::from("."), |h| h.join(".config").join("codeassist"))
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        codeassist_home().join("config.toml")
    }

    /// Returns the directory holding log files.
    pub fn logs_dir() -> PathBuf {
        codeassist_home().join("logs")
    }
}

/// Gemini provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiProviderConfig {
    /// API key (falls back to environment variables when unset).
    pub api_key: Option<String>,
    /// Base URL override.
    pub base_url: Option<String>,
}

/// Provider configuration (keys, base URLs).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub gemini: GeminiProviderConfig,
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The Gemini model to use
    pub model: String,

    /// System instruction sent with every prompt
    pub system_prompt: Option<String>,

    /// Maximum tokens for responses (optional)
    pub max_output_tokens: Option<u32>,

    /// Log filter directive (e.g. "info", "codeassist_core=debug")
    pub log_level: String,

    /// Provider configuration (keys, base URLs).
    pub providers: ProvidersConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_string(),
            system_prompt: Some(DEFAULT_SYSTEM_INSTRUCTION.to_string()),
            max_output_tokens: None,
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl Config {
    pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
    const DEFAULT_LOG_LEVEL: &str = "info";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Returns the system instruction to send, falling back to the built-in one
    /// when the configured value is missing or blank.
    pub fn effective_system_prompt(&self) -> &str {
        self.system_prompt
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SYSTEM_INSTRUCTION)
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to move {} into place at {}",
                tmp_path.display(),
                path.display()
            )
        })?;
        Ok(())
    }
}
