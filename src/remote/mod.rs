//! Remote catalog access.
//!
//! The reconciliation engine only ever talks to the catalog through the
//! [`RemoteCatalog`] trait; [`client::HttpCatalogClient`] is the production
//! implementation and tests substitute in-memory fakes.

pub mod client;
pub mod dedup;
mod models;

pub use client::HttpCatalogClient;
pub use models::{CandidateRelease, ReleaseKind, RemoteArtist, RemoteRelease};

use anyhow::Result;
use async_trait::async_trait;

/// Scope for release-by-name searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Albums,
    Tracks,
}

#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// Artists matching `name`, ordered by relevance. Empty is a valid
    /// answer, not an error.
    async fn search_artists(&self, name: &str) -> Result<Vec<RemoteArtist>>;

    /// The artist's releases: albums and EP/singles only, other catalog
    /// groupings are ignored.
    async fn artist_releases(&self, artist_id: u64) -> Result<Vec<RemoteRelease>>;

    /// Candidates for a specific release, filtered to exact title matches
    /// and deduplicated to one entry per (artist, title) key.
    async fn search_releases(
        &self,
        artist_name: &str,
        release_name: &str,
        scope: SearchScope,
    ) -> Result<Vec<CandidateRelease>>;
}
