//! Reconciliation driver: walks the local library, binds each artist group
//! to a remote artist, and reports or acquires releases with no local
//! counterpart.
//!
//! Artists and releases are processed strictly sequentially. Both the
//! catalog service and the acquisition tool are rate-sensitive external
//! resources, so there is deliberately no fan-out; every remote call is
//! awaited to completion before the next unit of work starts. Any failure
//! smaller than "the library root is unreadable" degrades to a logged skip
//! of that artist or release.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::acquire::ReleaseAcquirer;
use crate::library::index::{LocalContentIndex, DEFAULT_TOLERANCE};
use crate::library::{group_by_artist_key, scan_artist_folders, ArtistGroup};
use crate::matching::similarity;
use crate::remote::{RemoteCatalog, RemoteRelease};

/// Why a unit of work (one artist, one release) was skipped. Every variant
/// is locally recovered: logged, then the run moves on.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("no remote artist found for '{artist_key}'")]
    NotFound { artist_key: String },

    #[error(
        "artist name mismatch: '{artist_key}' != '{remote_name}' (similarity {similarity:.2})"
    )]
    Mismatch {
        artist_key: String,
        remote_name: String,
        similarity: f64,
    },

    #[error("remote call failed for '{artist_key}': {source:#}")]
    FetchFailure {
        artist_key: String,
        source: anyhow::Error,
    },

    #[error("acquisition failed for '{title}': {detail}")]
    AcquisitionFailure { title: String, detail: String },
}

#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    /// Minimum artist-name similarity for a remote match to be accepted.
    pub similarity_threshold: f64,
    /// Fuzzy tolerance for the local filename index.
    pub fuzzy_tolerance: f64,
    /// Report missing releases without invoking the acquisition tool.
    pub dry_run: bool,
    /// Restrict the run to the group with this artist key.
    pub only_artist: Option<String>,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            fuzzy_tolerance: DEFAULT_TOLERANCE,
            dry_run: false,
            only_artist: None,
        }
    }
}

pub struct Reconciler {
    catalog: Arc<dyn RemoteCatalog>,
    acquirer: Arc<dyn ReleaseAcquirer>,
    settings: ReconcileSettings,
}

impl Reconciler {
    pub fn new(
        catalog: Arc<dyn RemoteCatalog>,
        acquirer: Arc<dyn ReleaseAcquirer>,
        settings: ReconcileSettings,
    ) -> Self {
        Self {
            catalog,
            acquirer,
            settings,
        }
    }

    /// Run-to-completion reconciliation of the library under `root`.
    ///
    /// Results are emitted as log events; the only error returned is an
    /// unreadable library root.
    pub async fn reconcile(&self, root: &Path) -> Result<()> {
        let folders = scan_artist_folders(root)?;
        let groups = group_by_artist_key(folders);
        info!("Scanned {} artist group(s) under {:?}", groups.len(), root);

        for group in &groups {
            if let Some(only) = &self.settings.only_artist {
                if &group.artist_key != only {
                    continue;
                }
            }
            if group.artist_key.is_empty() {
                debug!(
                    "Skipping folder with empty artist key: {:?}",
                    group.primary().raw_name
                );
                continue;
            }
            self.reconcile_artist(group).await;
        }

        Ok(())
    }

    /// One artist group, start to finish. Never fails the run.
    async fn reconcile_artist(&self, group: &ArtistGroup) {
        let key = &group.artist_key;

        let artists = match self.catalog.search_artists(key).await {
            Ok(artists) => artists,
            Err(source) => {
                error!(
                    "{}",
                    SkipReason::FetchFailure {
                        artist_key: key.clone(),
                        source,
                    }
                );
                return;
            }
        };
        let Some(top) = artists.first() else {
            debug!("{}", SkipReason::NotFound {
                artist_key: key.clone(),
            });
            return;
        };

        let score = similarity(key, &top.name.to_lowercase());
        if score < self.settings.similarity_threshold {
            warn!(
                "{}",
                SkipReason::Mismatch {
                    artist_key: key.clone(),
                    remote_name: top.name.clone(),
                    similarity: score,
                }
            );
            return;
        }
        info!("Found artist match for '{}'", key);

        let releases = match self.catalog.artist_releases(top.id).await {
            Ok(releases) => releases,
            Err(source) => {
                error!(
                    "{}",
                    SkipReason::FetchFailure {
                        artist_key: key.clone(),
                        source,
                    }
                );
                return;
            }
        };
        if releases.is_empty() {
            debug!("Remote catalog has no releases for '{}'", key);
            return;
        }

        let entries = match group.pooled_entries() {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to list local files for '{}': {:#}", key, e);
                return;
            }
        };
        let index = LocalContentIndex::with_tolerance(entries, self.settings.fuzzy_tolerance);

        for release in &releases {
            self.reconcile_release(group, &index, release).await;
        }
    }

    /// One release: found locally, or missing and handed to acquisition.
    async fn reconcile_release(
        &self,
        group: &ArtistGroup,
        index: &LocalContentIndex,
        release: &RemoteRelease,
    ) {
        if !index.search(&release.title).is_empty() {
            info!("Found local match for '{}'", release.title);
            return;
        }

        warn!("No local match for '{}'", release.title);

        let folder_name = destination_name(release);
        if self.settings.dry_run {
            info!("Dry run: would acquire '{}'", folder_name);
            return;
        }

        let destination = group.primary().path.join(&folder_name);
        match self.acquirer.acquire(release.id, &destination).await {
            Ok(true) => {
                info!("Downloaded {} by {}", folder_name, group.primary().raw_name);
            }
            Ok(false) => {
                error!(
                    "{}",
                    SkipReason::AcquisitionFailure {
                        title: release.title.clone(),
                        detail: "the tool reported failure".to_string(),
                    }
                );
            }
            Err(e) => {
                error!(
                    "{}",
                    SkipReason::AcquisitionFailure {
                        title: release.title.clone(),
                        detail: format!("{e:#}"),
                    }
                );
            }
        }
    }
}

/// Destination folder name for a release: `"{title} ({year}) - {Album|Single}"`.
fn destination_name(release: &RemoteRelease) -> String {
    format!(
        "{} ({}) - {}",
        release.title,
        release.release_year,
        release.kind.label()
    )
}
