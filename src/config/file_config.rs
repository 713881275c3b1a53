use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub music_dir: Option<String>,
    pub config_dir: Option<String>,
    pub base_url: Option<String>,
    pub country_code: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub login_timeout_secs: Option<u64>,

    // Reconciliation tuning
    pub reconcile: Option<ReconcileConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ReconcileConfig {
    pub similarity_threshold: Option<f64>,
    pub fuzzy_tolerance: Option<f64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
