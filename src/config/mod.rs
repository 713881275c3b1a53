mod file_config;

pub use file_config::{FileConfig, ReconcileConfig};

use anyhow::{bail, Result};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://listen.tidal.com";
pub const DEFAULT_COUNTRY_CODE: &str = "US";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub music_dir: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
    pub base_url: String,
    pub country_code: String,
    pub request_timeout_secs: u64,
    pub login_timeout_secs: u64,
    pub similarity_threshold: f64,
    pub fuzzy_tolerance: f64,
    pub dry_run: bool,
    pub only_artist: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            music_dir: None,
            config_dir: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            request_timeout_secs: 30,
            login_timeout_secs: 300,
            similarity_threshold: 0.8,
            fuzzy_tolerance: 0.3,
            dry_run: false,
            only_artist: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub music_dir: PathBuf,
    pub config_dir: PathBuf,
    pub base_url: String,
    pub country_code: String,
    pub request_timeout_secs: u64,
    pub login_timeout_secs: u64,
    pub similarity_threshold: f64,
    pub fuzzy_tolerance: f64,
    pub dry_run: bool,
    pub only_artist: Option<String>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present; the `MUSIC_LIBRARY_PATH`
    /// environment variable is the last resort for the library root.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let music_dir = file
            .music_dir
            .map(PathBuf::from)
            .or_else(|| cli.music_dir.clone())
            .or_else(|| std::env::var("MUSIC_LIBRARY_PATH").ok().map(PathBuf::from))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "music_dir must be specified as an argument, in the config file, \
                     or via MUSIC_LIBRARY_PATH"
                )
            })?;

        if !music_dir.exists() {
            bail!("Music library directory does not exist: {:?}", music_dir);
        }
        if !music_dir.is_dir() {
            bail!("music_dir is not a directory: {:?}", music_dir);
        }

        let config_dir = file
            .config_dir
            .map(PathBuf::from)
            .or_else(|| cli.config_dir.clone())
            .unwrap_or_else(|| {
                std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join("config")
            });

        let base_url = file.base_url.unwrap_or_else(|| cli.base_url.clone());
        let country_code = file
            .country_code
            .unwrap_or_else(|| cli.country_code.clone());
        let request_timeout_secs = file
            .request_timeout_secs
            .unwrap_or(cli.request_timeout_secs);
        let login_timeout_secs = file.login_timeout_secs.unwrap_or(cli.login_timeout_secs);

        let reconcile = file.reconcile.unwrap_or_default();
        let similarity_threshold = reconcile
            .similarity_threshold
            .unwrap_or(cli.similarity_threshold);
        let fuzzy_tolerance = reconcile.fuzzy_tolerance.unwrap_or(cli.fuzzy_tolerance);

        if !(0.0..=1.0).contains(&similarity_threshold) {
            bail!(
                "similarity_threshold must be within [0, 1], got {}",
                similarity_threshold
            );
        }
        if !(0.0..=1.0).contains(&fuzzy_tolerance) {
            bail!(
                "fuzzy_tolerance must be within [0, 1], got {}",
                fuzzy_tolerance
            );
        }

        Ok(Self {
            music_dir,
            config_dir,
            base_url,
            country_code,
            request_timeout_secs,
            login_timeout_secs,
            similarity_threshold,
            fuzzy_tolerance,
            dry_run: cli.dry_run,
            only_artist: cli.only_artist.clone(),
        })
    }
}
