//! TOML configuration loading.

use redraw_core::config::EngineConfig;
use redraw_core::error::{RedrawError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Returns the default configuration file path (~/.redraw/config.toml).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| RedrawError::persistence("Failed to get home directory"))?;
    Ok(home_dir.join(".redraw").join("config.toml"))
}

/// Loads engine configuration from a TOML file.
///
/// A missing file yields the built-in defaults; a present but malformed
/// file is a hard error rather than a silent fallback.
pub async fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        tracing::debug!(
            "[config_loader] No config file at {:?}, using defaults",
            path
        );
        return Ok(EngineConfig::default());
    }

    let content = fs::read_to_string(path).await.map_err(|e| {
        RedrawError::persistence(format!("Failed to read config file {path:?}: {e}"))
    })?;

    let config: EngineConfig = toml::from_str(&content)?;
    Ok(config)
}
