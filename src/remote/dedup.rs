//! Collapses release-search noise down to one candidate per logical release.
//!
//! Search returns every variant of a release the catalog knows about
//! (clean/explicit, lossy/lossless). The pipeline is: filter to exact title
//! matches, sort by descending popularity, then fold variants into a single
//! representative per (artist, title) key.

use std::collections::HashMap;

use super::models::CandidateRelease;

const LOSSLESS_TAG: &str = "LOSSLESS";

/// Drop candidates whose title does not exactly equal the queried release
/// name (case-sensitive). Keeps unrelated search hits out of the dedup pool.
pub fn filter_exact_title(
    candidates: Vec<CandidateRelease>,
    release_name: &str,
) -> Vec<CandidateRelease> {
    candidates
        .into_iter()
        .filter(|c| c.name == release_name)
        .collect()
}

/// Most popular first; dedup resolves ties toward the candidate seen first.
pub fn sort_by_popularity_desc(candidates: &mut [CandidateRelease]) {
    candidates.sort_by(|a, b| b.popularity.cmp(&a.popularity));
}

/// Reduce a popularity-ordered candidate list to one entry per
/// (artist, title) key.
///
/// A held entry survives a newcomer when it is explicit and the newcomer is
/// not, or when it carries the LOSSLESS tag and the newcomer does not;
/// otherwise the newcomer replaces it. Retaining the explicit variant reads
/// backwards for a cleanliness preference, but it is the established
/// behavior and stays until someone confirms it should flip.
pub fn dedup_candidates(candidates: Vec<CandidateRelease>) -> Vec<CandidateRelease> {
    let mut order: Vec<String> = Vec::new();
    let mut by_key: HashMap<String, CandidateRelease> = HashMap::new();

    for candidate in candidates {
        let key = candidate.dedup_key();
        match by_key.get(&key) {
            None => {
                order.push(key.clone());
                by_key.insert(key, candidate);
            }
            Some(existing) => {
                if existing.explicit && !candidate.explicit {
                    continue;
                }
                if has_lossless(existing) && !has_lossless(&candidate) {
                    continue;
                }
                by_key.insert(key, candidate);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| by_key.remove(&key))
        .collect()
}

fn has_lossless(candidate: &CandidateRelease) -> bool {
    candidate.tags.iter().any(|t| t == LOSSLESS_TAG)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: u64, name: &str, explicit: bool, tags: &[&str], popularity: i64) -> CandidateRelease {
        CandidateRelease {
            id,
            name: name.to_string(),
            artist_name: "Jane Doe".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            explicit,
            popularity,
        }
    }

    #[test]
    fn test_filter_exact_title_is_case_sensitive() {
        let candidates = vec![
            candidate(1, "Hit Track", false, &[], 10),
            candidate(2, "hit track", false, &[], 20),
            candidate(3, "Hit Track (Deluxe)", false, &[], 30),
        ];
        let filtered = filter_exact_title(candidates, "Hit Track");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn test_sort_by_popularity_desc() {
        let mut candidates = vec![
            candidate(1, "A", false, &[], 5),
            candidate(2, "B", false, &[], 50),
            candidate(3, "C", false, &[], 20),
        ];
        sort_by_popularity_desc(&mut candidates);
        let ids: Vec<u64> = candidates.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_dedup_one_entry_per_key() {
        let deduped = dedup_candidates(vec![
            candidate(1, "Hit Track", false, &[], 50),
            candidate(2, "Hit Track", false, &[], 40),
            candidate(3, "Other Song", false, &[], 30),
        ]);
        assert_eq!(deduped.len(), 2);
        let mut keys: Vec<String> = deduped.iter().map(|c| c.dedup_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_explicit_entry_survives_non_explicit_newcomer() {
        let deduped = dedup_candidates(vec![
            candidate(1, "Hit Track", true, &[], 50),
            candidate(2, "Hit Track", false, &[], 40),
        ]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].id, 1);
    }

    #[test]
    fn test_explicit_variant_wins_regardless_of_arrival_order() {
        // Explicit arriving second replaces the plain entry outright.
        let deduped = dedup_candidates(vec![
            candidate(1, "Hit Track", false, &[], 50),
            candidate(2, "Hit Track", true, &[], 40),
        ]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].id, 2);
        assert!(deduped[0].explicit);
    }

    #[test]
    fn test_lossless_entry_survives_lossy_newcomer() {
        let deduped = dedup_candidates(vec![
            candidate(1, "Hit Track", false, &["LOSSLESS"], 50),
            candidate(2, "Hit Track", false, &[], 40),
        ]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].id, 1);
    }

    #[test]
    fn test_qualifying_newcomer_replaces_held_entry() {
        // Newcomer is explicit too, so the explicit guard does not reject it.
        let deduped = dedup_candidates(vec![
            candidate(1, "Hit Track", true, &[], 50),
            candidate(2, "Hit Track", true, &["LOSSLESS"], 40),
        ]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].id, 2);
    }

    #[test]
    fn test_plain_newcomer_replaces_plain_entry() {
        // Neither guard applies, so replacement is unconditional: the last
        // qualifying candidate holds the slot.
        let deduped = dedup_candidates(vec![
            candidate(1, "Hit Track", false, &[], 50),
            candidate(2, "Hit Track", false, &[], 10),
        ]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].id, 2);
    }

    #[test]
    fn test_distinct_artists_do_not_collide() {
        let mut other = candidate(2, "Hit Track", false, &[], 40);
        other.artist_name = "Someone Else".to_string();
        let deduped = dedup_candidates(vec![candidate(1, "Hit Track", false, &[], 50), other]);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let deduped = dedup_candidates(vec![
            candidate(1, "First", false, &[], 50),
            candidate(2, "Second", false, &[], 40),
            candidate(3, "First", false, &[], 30),
        ]);
        let names: Vec<&str> = deduped.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }
}
