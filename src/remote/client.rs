//! HTTP shell implementing [`RemoteCatalog`] against the streaming service's
//! listen API.
//!
//! The bearer token is handed in at construction (the acquisition tool's
//! login produces it); nothing here holds process-wide state.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::Deserialize;

use super::dedup::{dedup_candidates, filter_exact_title, sort_by_popularity_desc};
use super::models::{CandidateRelease, ReleaseKind, RemoteArtist, RemoteRelease};
use super::{RemoteCatalog, SearchScope};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/115.0";
const SEARCH_LIMIT: &str = "25";

/// Client for the remote catalog's search and artist-page endpoints.
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
    bearer_token: String,
    country_code: String,
}

impl HttpCatalogClient {
    /// # Arguments
    /// * `base_url` - Base URL of the catalog API (e.g., "https://listen.example.com")
    /// * `bearer_token` - Access token obtained via the acquisition tool's login
    /// * `timeout_secs` - Request timeout in seconds
    pub fn new(
        base_url: String,
        bearer_token: String,
        country_code: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            bearer_token,
            country_code,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Catalog request to {} failed with status: {}",
                url,
                response.status()
            ));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RemoteCatalog for HttpCatalogClient {
    async fn search_artists(&self, name: &str) -> Result<Vec<RemoteArtist>> {
        let url = format!("{}/v1/search/top-hits", self.base_url);
        let response: TopHitsResponse = self
            .get_json(
                &url,
                &[
                    ("query", name),
                    ("limit", SEARCH_LIMIT),
                    ("offset", "0"),
                    ("types", "ARTISTS"),
                    ("countryCode", &self.country_code),
                    ("locale", "en_US"),
                    ("deviceType", "DESKTOP"),
                ],
            )
            .await?;

        Ok(response
            .artists
            .items
            .into_iter()
            .map(|a| RemoteArtist {
                id: a.id,
                name: a.name,
            })
            .collect())
    }

    async fn artist_releases(&self, artist_id: u64) -> Result<Vec<RemoteRelease>> {
        let url = format!("{}/v1/pages/artist", self.base_url);
        let artist_id = artist_id.to_string();
        let response: ArtistPageResponse = self
            .get_json(
                &url,
                &[
                    ("artistId", artist_id.as_str()),
                    ("countryCode", &self.country_code),
                    ("locale", "en_US"),
                    ("deviceType", "BROWSER"),
                ],
            )
            .await?;

        let mut releases = Vec::new();
        for row in response.rows {
            // Each page row carries one leading module; the rest is
            // presentation filler.
            let Some(module) = row.modules.into_iter().next() else {
                continue;
            };
            let Some(kind) = module.title.as_deref().and_then(kind_for_module_title) else {
                continue;
            };
            let Some(paged_list) = module.paged_list else {
                continue;
            };

            for item in paged_list.items {
                let Some(release_year) = item.release_year() else {
                    tracing::debug!("Skipping release with unparsable date: {}", item.title);
                    continue;
                };
                releases.push(RemoteRelease {
                    id: item.id,
                    title: item.title,
                    release_year,
                    kind,
                });
            }
        }

        Ok(releases)
    }

    async fn search_releases(
        &self,
        artist_name: &str,
        release_name: &str,
        scope: SearchScope,
    ) -> Result<Vec<CandidateRelease>> {
        let path = match scope {
            SearchScope::Albums => "albums",
            SearchScope::Tracks => "tracks",
        };
        let url = format!("{}/v1/search/{}", self.base_url, path);
        let query = format!("{} {}", artist_name, release_name);
        let response: ReleaseSearchResponse = self
            .get_json(
                &url,
                &[
                    ("query", query.as_str()),
                    ("limit", SEARCH_LIMIT),
                    ("offset", "0"),
                    ("countryCode", &self.country_code),
                    ("locale", "en_US"),
                    ("deviceType", "DESKTOP"),
                ],
            )
            .await?;

        let items: Vec<WireCandidate> = match scope {
            SearchScope::Albums => response.items,
            // Track hits are filtered by their parent album's title before
            // mapping, since the candidate name is the item's own title.
            SearchScope::Tracks => response
                .items
                .into_iter()
                .filter(|item| {
                    item.album
                        .as_ref()
                        .is_some_and(|album| album.title == release_name)
                })
                .collect(),
        };

        let mut candidates: Vec<CandidateRelease> = items
            .into_iter()
            .filter_map(|item| item.into_candidate())
            .collect();

        if scope == SearchScope::Albums {
            candidates = filter_exact_title(candidates, release_name);
        }
        sort_by_popularity_desc(&mut candidates);
        Ok(dedup_candidates(candidates))
    }
}

fn kind_for_module_title(title: &str) -> Option<ReleaseKind> {
    match title {
        "Albums" => Some(ReleaseKind::Album),
        "EP & Singles" => Some(ReleaseKind::Single),
        _ => None,
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct TopHitsResponse {
    artists: ArtistItems,
}

#[derive(Debug, Deserialize)]
struct ArtistItems {
    items: Vec<WireArtist>,
}

#[derive(Debug, Deserialize)]
struct WireArtist {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ArtistPageResponse {
    rows: Vec<PageRow>,
}

#[derive(Debug, Deserialize)]
struct PageRow {
    #[serde(default)]
    modules: Vec<PageModule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageModule {
    title: Option<String>,
    paged_list: Option<PagedList>,
}

#[derive(Debug, Deserialize)]
struct PagedList {
    #[serde(default)]
    items: Vec<WireRelease>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRelease {
    id: u64,
    title: String,
    stream_start_date: Option<String>,
    release_date: Option<String>,
}

impl WireRelease {
    /// Year of the stream start date, falling back to the release date.
    fn release_year(&self) -> Option<i32> {
        self.stream_start_date
            .as_deref()
            .and_then(parse_year)
            .or_else(|| self.release_date.as_deref().and_then(parse_year))
    }
}

/// Dates arrive as full timestamps ("2020-03-18T00:00:00.000+0000"); the
/// leading calendar date is all we need.
fn parse_year(date: &str) -> Option<i32> {
    let date = date.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}

#[derive(Debug, Deserialize)]
struct ReleaseSearchResponse {
    #[serde(default)]
    items: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    id: u64,
    title: String,
    #[serde(default)]
    artists: Vec<WireArtistRef>,
    media_metadata: Option<WireMediaMetadata>,
    #[serde(default)]
    explicit: bool,
    #[serde(default)]
    popularity: i64,
    album: Option<WireAlbumRef>,
}

#[derive(Debug, Deserialize)]
struct WireArtistRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireMediaMetadata {
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WireAlbumRef {
    title: String,
}

impl WireCandidate {
    /// None when the item has no credited artist to key on.
    fn into_candidate(self) -> Option<CandidateRelease> {
        let artist_name = self.artists.into_iter().next()?.name;
        Some(CandidateRelease {
            id: self.id,
            name: self.title,
            artist_name,
            tags: self.media_metadata.map(|m| m.tags).unwrap_or_default(),
            explicit: self.explicit,
            popularity: self.popularity,
        })
    }
}
