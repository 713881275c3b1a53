use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use catalog_sync::acquire::{LoginOutcome, ReleaseAcquirer, TidalDlAcquirer};
use catalog_sync::config::{AppConfig, CliConfig, FileConfig, DEFAULT_BASE_URL, DEFAULT_COUNTRY_CODE};
use catalog_sync::reconcile::{ReconcileSettings, Reconciler};
use catalog_sync::remote::{HttpCatalogClient, RemoteCatalog};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Root of the local music library (one folder per artist). Falls back
    /// to the MUSIC_LIBRARY_PATH environment variable.
    #[clap(value_parser = parse_path)]
    pub music_dir: Option<PathBuf>,

    /// Path to a TOML config file; its values override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory for the acquisition tool's settings and token files.
    #[clap(long, value_parser = parse_path)]
    pub config_dir: Option<PathBuf>,

    /// Base URL of the remote catalog API.
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Country code sent with catalog requests.
    #[clap(long, default_value = DEFAULT_COUNTRY_CODE)]
    pub country_code: String,

    /// Timeout in seconds for catalog requests.
    #[clap(long, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Maximum time in seconds to wait for the acquisition tool's login.
    #[clap(long, default_value_t = 300)]
    pub login_timeout_secs: u64,

    /// Minimum artist-name similarity for a remote match to be accepted.
    #[clap(long, default_value_t = 0.8)]
    pub similarity_threshold: f64,

    /// Fuzzy tolerance for matching release titles against local filenames.
    #[clap(long, default_value_t = 0.3)]
    pub fuzzy_tolerance: f64,

    /// Report missing releases without acquiring anything.
    #[clap(long)]
    pub dry_run: bool,

    /// Only reconcile the artist with this key (normalized folder name).
    #[clap(long)]
    pub only_artist: Option<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            music_dir: self.music_dir.clone(),
            config_dir: self.config_dir.clone(),
            base_url: self.base_url.clone(),
            country_code: self.country_code.clone(),
            request_timeout_secs: self.request_timeout_secs,
            login_timeout_secs: self.login_timeout_secs,
            similarity_threshold: self.similarity_threshold,
            fuzzy_tolerance: self.fuzzy_tolerance,
            dry_run: self.dry_run,
            only_artist: self.only_artist.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    std::fs::create_dir_all(&config.config_dir)
        .with_context(|| format!("Failed to create config directory: {:?}", config.config_dir))?;
    info!("Configuration directory: {:?}", config.config_dir);

    let acquirer = TidalDlAcquirer::new(
        config.config_dir.clone(),
        Duration::from_secs(config.login_timeout_secs),
    );

    // Tool missing entirely is the one fatal precondition; everything after
    // this degrades to per-artist or per-release skips.
    acquirer.validate().await?;
    acquirer.write_settings()?;

    let bearer_token = match acquirer.login().await? {
        LoginOutcome::Authenticated(token) => {
            info!("Logged in to the streaming service successfully.");
            token
        }
        LoginOutcome::Failed(reason) => {
            error!("Login failed ({}); catalog lookups will not succeed.", reason);
            String::new()
        }
        LoginOutcome::TimedOut => {
            error!("Login timed out; catalog lookups will not succeed.");
            String::new()
        }
    };

    let catalog = HttpCatalogClient::new(
        config.base_url.clone(),
        bearer_token,
        config.country_code.clone(),
        config.request_timeout_secs,
    )?;

    let settings = ReconcileSettings {
        similarity_threshold: config.similarity_threshold,
        fuzzy_tolerance: config.fuzzy_tolerance,
        dry_run: config.dry_run,
        only_artist: config.only_artist.clone(),
    };
    let reconciler = Reconciler::new(
        Arc::new(catalog) as Arc<dyn RemoteCatalog>,
        Arc::new(acquirer) as Arc<dyn ReleaseAcquirer>,
        settings,
    );

    reconciler.reconcile(&config.music_dir).await
}
