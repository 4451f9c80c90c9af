//! Runtime configuration: CLI flags, env fallbacks, and the user TOML file.
//!
//! Precedence per value: command line / env var, then `config.toml`, then the
//! built-in default.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use serde::{Deserialize, Serialize};

pub const DEFAULT_INTERPRETER: &str = "python";
pub const DEFAULT_BACKEND_SCRIPT: &str = "backend/test.py";
pub const DEFAULT_SETTINGS_FILE: &str = "backend/settings.json";
const CONFIG_DIR_NAME: &str = "gbf-settings";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, Args)]
pub struct AppConfig {
    /// Interpreter command for the backend, arguments allowed (e.g. "py -3")
    #[arg(long, global = true, env = "GBF_SETTINGS_INTERPRETER")]
    pub interpreter: Option<String>,

    /// Backend test entrypoint passed to the interpreter
    #[arg(long = "backend-script", global = true, env = "GBF_SETTINGS_BACKEND_SCRIPT")]
    pub backend_script: Option<PathBuf>,

    /// Settings file shared with the backend
    #[arg(long = "settings-file", global = true, env = "GBF_SETTINGS_FILE")]
    pub settings_file: Option<PathBuf>,

    /// Append JSON trace logs to GBF_SETTINGS_TRACE_LOG (or the temp dir)
    #[arg(long, global = true, default_value_t = false)]
    pub logs: bool,

    /// Lower the log threshold to debug
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,
}

/// Persisted user defaults (`~/.config/gbf-settings/config.toml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub interpreter: Option<String>,
    pub backend_script: Option<PathBuf>,
    pub settings_file: Option<PathBuf>,
}

/// Fully resolved configuration used by the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub interpreter: String,
    pub backend_script: PathBuf,
    pub settings_file: PathBuf,
    pub logs: bool,
    pub debug: bool,
}

impl AppConfig {
    /// Fill unset values from the user file, then defaults, and validate.
    pub fn resolve(&self, user: &UserConfig) -> Result<ResolvedConfig> {
        let resolved = ResolvedConfig {
            interpreter: self
                .interpreter
                .clone()
                .or_else(|| user.interpreter.clone())
                .unwrap_or_else(|| DEFAULT_INTERPRETER.to_string()),
            backend_script: self
                .backend_script
                .clone()
                .or_else(|| user.backend_script.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKEND_SCRIPT)),
            settings_file: self
                .settings_file
                .clone()
                .or_else(|| user.settings_file.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE)),
            logs: self.logs,
            debug: self.debug,
        };
        resolved.validate()?;
        Ok(resolved)
    }
}

impl ResolvedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.interpreter.trim().is_empty() {
            bail!("--interpreter must not be empty");
        }
        if self.backend_script.as_os_str().is_empty() {
            bail!("--backend-script must not be empty");
        }
        if self.settings_file.as_os_str().is_empty() {
            bail!("--settings-file must not be empty");
        }
        Ok(())
    }
}

/// `GBF_SETTINGS_CONFIG` override, else the platform config dir.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("GBF_SETTINGS_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load the user file; a missing or malformed file yields defaults.
#[must_use]
pub fn load_user_config() -> UserConfig {
    match user_config_path() {
        Some(path) => load_user_config_from(&path),
        None => UserConfig::default(),
    }
}

pub(crate) fn load_user_config_from(path: &Path) -> UserConfig {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return UserConfig::default(),
        Err(err) => {
            tracing::warn!(path = %path.display(), "failed to read user config: {err}");
            return UserConfig::default();
        }
    };
    match toml::from_str(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %path.display(), "ignoring malformed user config: {err}");
            UserConfig::default()
        }
    }
}
