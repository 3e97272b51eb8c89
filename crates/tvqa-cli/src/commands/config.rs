//! Configuration discovery.
//!
//! Lookup order: `--config`, `./tvqa.json`, then `<config dir>/tvqa/config.json`.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tvqa_core::config::HarnessConfig;

pub const LOCAL_CONFIG: &str = "tvqa.json";

/// `<user config dir>/tvqa/config.json`, when the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tvqa").join("config.json"))
}

/// Every location searched when no explicit path is given, in order.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
    paths.extend(user_config_path());
    paths
}

/// Find the config file to load. An explicit path must exist.
pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !path.is_file() {
            bail!("Config file not found: {}", path.display());
        }
        return Ok(path.to_path_buf());
    }

    let candidates = search_paths();
    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        return Ok(found.clone());
    }

    bail!(
        "No configuration found. Looked in: {}. Platform base URLs must be configured; see tvqa.example.json.",
        candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    )
}

pub fn load(explicit: Option<&Path>) -> Result<(HarnessConfig, PathBuf)> {
    let path = locate(explicit)?;
    let config = HarnessConfig::from_file(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    Ok((config, path))
}
