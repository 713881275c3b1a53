//! Acquisition of release content via an external downloader tool.

pub mod tidal_dl;

pub use tidal_dl::TidalDlAcquirer;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Result of driving the tool's interactive login to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Logged in; carries the access token for catalog requests.
    Authenticated(String),
    Failed(String),
    TimedOut,
}

#[async_trait]
pub trait ReleaseAcquirer: Send + Sync {
    /// Check that the tool is usable at all. A failure here is fatal to the
    /// whole run; nothing else in this trait is.
    async fn validate(&self) -> Result<()>;

    /// Drive the tool's login flow to one of the three outcomes. The wait is
    /// bounded; a stuck login resolves to [`LoginOutcome::TimedOut`].
    async fn login(&self) -> Result<LoginOutcome>;

    /// Fetch one release into `destination`. `Ok(false)` means the tool ran
    /// but reported failure; both that and `Err` are per-release events the
    /// caller logs and moves past.
    async fn acquire(&self, release_id: u64, destination: &Path) -> Result<bool>;
}
