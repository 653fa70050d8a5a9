//! Configuration loading and persistence
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/recap/config.toml`
//! (~/.config/recap/config.toml); a missing file yields full defaults.
//! Logs go to `$XDG_STATE_HOME/recap/` per the XDG Base Directory
//! Specification.
//!
//! The loaded value is constructed once per invocation and threaded as a
//! parameter into the pipeline, redaction engine, and LLM client factory —
//! there is no global configuration state.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Directory reports are written under when analysis output is saved
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// IANA timezone used for day boundaries
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// LLM provider configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Redaction configuration
    #[serde(default)]
    pub redact: RedactConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            output_dir: default_output_dir(),
            redact: RedactConfig::default(),
            timezone: default_timezone(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_timezone() -> String {
    crate::time::DEFAULT_TIMEZONE.to_string()
}

/// LLM provider configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Provider variant
    #[serde(default)]
    pub provider: LlmProvider,
    /// API key (falls back to the provider's env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API endpoint override (required for `generic` deployments)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Openai,
    Anthropic,
    Generic,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Openai => "openai",
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::Generic => "generic",
        }
    }

    /// Returns the default endpoint for this provider
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            LlmProvider::Openai | LlmProvider::Generic => "https://api.openai.com/v1",
            LlmProvider::Anthropic => "https://api.anthropic.com",
        }
    }

    /// Returns the default model for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Openai => "gpt-4o-mini",
            LlmProvider::Anthropic => "claude-3-haiku-20240307",
            LlmProvider::Generic => "gpt-3.5-turbo",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "openai" => Ok(LlmProvider::Openai),
            "anthropic" => Ok(LlmProvider::Anthropic),
            "generic" => Ok(LlmProvider::Generic),
            _ => Err(format!("unknown LLM provider: {}", s)),
        }
    }
}

/// Redaction configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedactConfig {
    /// Enable/disable redaction globally
    #[serde(default = "default_redact_enabled")]
    pub enabled: bool,

    /// Regular-expression source strings, applied in order
    #[serde(default = "default_redact_patterns")]
    pub patterns: Vec<String>,
}

impl Default for RedactConfig {
    fn default() -> Self {
        Self {
            enabled: default_redact_enabled(),
            patterns: default_redact_patterns(),
        }
    }
}

fn default_redact_enabled() -> bool {
    true
}

/// Built-in sensitive-content patterns.
pub fn default_redact_patterns() -> Vec<String> {
    [
        r"sk-[a-zA-Z0-9]{48}",                             // OpenAI API keys
        r"sk-ant-[a-zA-Z0-9-]{95}",                        // Anthropic API keys
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}", // Email addresses
        r"\b\d{3}-\d{2}-\d{4}\b",                          // SSN format
        r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b",                  // Phone numbers
        r"ghp_[a-zA-Z0-9]{36}",                            // GitHub personal access tokens
        r"Bearer [a-zA-Z0-9_=-]+",                         // Bearer tokens
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::debug!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Persist this configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(&config_path, content)?;

        tracing::info!(path = %config_path.display(), "Configuration saved");
        Ok(())
    }

    /// Update one configuration value by key (the `config set` surface).
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "provider" => self.llm.provider = value.parse().map_err(Error::Config)?,
            "model" => self.llm.model = Some(value.to_string()),
            "api-key" => self.llm.api_key = Some(value.to_string()),
            "base-url" => self.llm.base_url = Some(value.to_string()),
            "output-dir" => self.output_dir = PathBuf::from(value),
            "timezone" => self.timezone = value.to_string(),
            other => {
                return Err(Error::Config(format!(
                    "unknown config key: {} (expected provider, model, api-key, base-url, output-dir, or timezone)",
                    other
                )))
            }
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/recap/config.toml` (~/.config/recap/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("recap").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/recap/` (~/.local/state/recap/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("recap")
    }
}
