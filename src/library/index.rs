//! Ephemeral fuzzy index over one artist group's filenames.
//!
//! Built fresh per artist and discarded after use; artist folders are small
//! enough that a linear scan per query is fine. Matching has to tolerate the
//! usual divergence between catalog titles and local names (track numbers,
//! bitrate tags, bracketed metadata, the odd typo), so it combines
//! case-insensitive substring containment with windowed edit distance.

use crate::matching::substring_distance;

/// Fraction of the query length allowed as edit distance before an entry
/// stops counting as a match.
pub const DEFAULT_TOLERANCE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexMatch {
    pub filename: String,
    /// Edit distance normalized by query length; 0.0 is an exact
    /// (substring) hit.
    pub score: f64,
}

#[derive(Debug)]
pub struct LocalContentIndex {
    entries: Vec<IndexEntry>,
    tolerance: f64,
}

#[derive(Debug)]
struct IndexEntry {
    original: String,
    lowered: String,
}

impl LocalContentIndex {
    pub fn build<I>(filenames: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self::with_tolerance(filenames, DEFAULT_TOLERANCE)
    }

    pub fn with_tolerance<I>(filenames: I, tolerance: f64) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let entries = filenames
            .into_iter()
            .map(|original| IndexEntry {
                lowered: original.to_lowercase(),
                original,
            })
            .collect();
        Self { entries, tolerance }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Matches for `query`, best first. Empty result means no local content
    /// resembles the queried title.
    pub fn search(&self, query: &str) -> Vec<IndexMatch> {
        let query = query.to_lowercase();
        let query_len = query.chars().count();
        if query_len == 0 {
            return Vec::new();
        }

        let max_distance = (self.tolerance * query_len as f64).floor() as usize;

        let mut matches: Vec<IndexMatch> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let distance = if entry.lowered.contains(&query) {
                    0
                } else {
                    substring_distance(&query, &entry.lowered)
                };
                if distance > max_distance {
                    return None;
                }
                Some(IndexMatch {
                    filename: entry.original.clone(),
                    score: distance as f64 / query_len as f64,
                })
            })
            .collect();

        matches.sort_by(|a, b| a.score.total_cmp(&b.score));
        matches
    }
}
