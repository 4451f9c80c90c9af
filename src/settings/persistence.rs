//! Settings-file handoff so the backend and later CLI runs see the same aggregate.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::Settings;

/// Load settings from `path`, or defaults when the file does not exist yet.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no settings file yet; using defaults");
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse settings file {}", path.display()))
}

/// Write settings as pretty JSON, creating parent directories as needed.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(settings).context("failed to serialize settings")?;
    let mut file = fs::File::create(path)
        .with_context(|| format!("failed to create settings file {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()?;
    tracing::debug!(path = %path.display(), "saved settings");
    Ok(())
}
