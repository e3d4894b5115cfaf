//! Configuration module for ga-search
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Environment variable pointing at an explicit settings file
pub const SETTINGS_PATH_ENV: &str = "GA_SEARCH_SETTINGS_PATH";

/// Load settings from an explicit path, the usual locations, or defaults
///
/// Environment overrides are merged in every case.
pub fn load(explicit: Option<PathBuf>) -> Result<Settings> {
    if let Some(ref path) = explicit {
        if !path.exists() {
            anyhow::bail!("Settings file not found: {}", path.display());
        }
    }

    let from_env = std::env::var(SETTINGS_PATH_ENV).ok().map(PathBuf::from);

    let mut candidates: Vec<PathBuf> = explicit.into_iter().chain(from_env).collect();
    candidates.push(PathBuf::from("settings.yml"));
    candidates.push(PathBuf::from("config/settings.yml"));
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("ga-search/settings.yml"));
    }

    for path in candidates {
        if path.exists() {
            info!("Loading settings from: {}", path.display());
            let mut settings = Settings::from_file(&path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}
