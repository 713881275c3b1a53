//! Domain models for remote catalog entities.

use serde::{Deserialize, Serialize};

/// An artist as returned by remote search, already reduced to what the
/// engine needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteArtist {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseKind {
    Album,
    Single,
}

impl ReleaseKind {
    /// Label used in destination folder names.
    pub fn label(&self) -> &'static str {
        match self {
            ReleaseKind::Album => "Album",
            ReleaseKind::Single => "Single",
        }
    }
}

/// One release in a remote artist's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRelease {
    pub id: u64,
    pub title: String,
    pub release_year: i32,
    pub kind: ReleaseKind,
}

/// A raw release-search result, before deduplication. Multiple candidates
/// may represent the same logical release in different audio or explicitness
/// variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRelease {
    pub id: u64,
    pub name: String,
    pub artist_name: String,
    pub tags: Vec<String>,
    pub explicit: bool,
    pub popularity: i64,
}

impl CandidateRelease {
    /// Dedup key shared by all variants of the same logical release.
    pub fn dedup_key(&self) -> String {
        format!("{} - {}", self.artist_name, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_kind_labels() {
        assert_eq!(ReleaseKind::Album.label(), "Album");
        assert_eq!(ReleaseKind::Single.label(), "Single");
    }

    #[test]
    fn test_dedup_key_format() {
        let candidate = CandidateRelease {
            id: 7,
            name: "Hit Track".to_string(),
            artist_name: "Jane Doe".to_string(),
            tags: vec![],
            explicit: false,
            popularity: 10,
        };
        assert_eq!(candidate.dedup_key(), "Jane Doe - Hit Track");
    }
}
