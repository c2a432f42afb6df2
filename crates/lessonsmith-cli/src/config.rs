//! Configuration file management for lessonsmith.
//!
//! Provides a TOML config file at `~/.config/lessonsmith/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use lessonsmith_core::config::GenerationConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub generation: GenerationSection,
    #[serde(default)]
    pub auth: AuthSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationSection {
    pub model: String,
    pub api_base: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AuthSection {
    /// API key for the generation backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the lessonsmith config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/lessonsmith` or
/// `~/.config/lessonsmith`, on every platform.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("lessonsmith");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("lessonsmith")
}

/// Return the path to the lessonsmith config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    toml::from_str(&contents).context("failed to parse config file")
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(config, &config_path())
}

/// Write `config` to `path` with owner-only permissions on Unix.
pub fn save_config_to(config: &ConfigFile, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    // The file may hold an API key.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct LessonsmithConfig {
    pub generation: GenerationConfig,
}

impl LessonsmithConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Model: `cli_model` > `LESSONSMITH_MODEL` > `generation.model` > `gpt-4`
    /// - API base: `cli_api_base` > `LESSONSMITH_API_BASE` > `generation.api_base` > OpenAI
    /// - API key: `OPENAI_API_KEY` > `auth.api_key` > none
    pub fn resolve(cli_model: Option<&str>, cli_api_base: Option<&str>) -> Self {
        let file_config = load_config().ok();
        Self::resolve_with(cli_model, cli_api_base, file_config.as_ref())
    }

    fn resolve_with(
        cli_model: Option<&str>,
        cli_api_base: Option<&str>,
        file_config: Option<&ConfigFile>,
    ) -> Self {
        let model = if let Some(model) = cli_model {
            model.to_string()
        } else if let Some(model) = env_non_empty(GenerationConfig::MODEL_ENV) {
            model
        } else if let Some(cfg) = file_config {
            cfg.generation.model.clone()
        } else {
            GenerationConfig::DEFAULT_MODEL.to_string()
        };

        let api_base = if let Some(base) = cli_api_base {
            base.to_string()
        } else if let Some(base) = env_non_empty(GenerationConfig::API_BASE_ENV) {
            base
        } else if let Some(cfg) = file_config {
            cfg.generation.api_base.clone()
        } else {
            GenerationConfig::DEFAULT_API_BASE.to_string()
        };

        let api_key = env_non_empty(GenerationConfig::API_KEY_ENV)
            .or_else(|| file_config.and_then(|cfg| cfg.auth.api_key.clone()));

        Self {
            generation: GenerationConfig {
                api_key,
                api_base,
                model,
                max_tokens: GenerationConfig::DEFAULT_MAX_TOKENS,
            },
        }
    }

    /// Fail unless an API key was found.
    pub fn require_api_key(&self) -> Result<()> {
        if self.generation.api_key.is_none() {
            bail!(
                "API key not found; set {} or run `lessonsmith init --api-key <KEY>`",
                GenerationConfig::API_KEY_ENV
            );
        }
        Ok(())
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
