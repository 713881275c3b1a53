//! Edit distance calculations backing the fuzzy filename index.

/// Levenshtein (edit) distance between two strings: the minimum number of
/// single-character insertions, deletions, or substitutions required to turn
/// one into the other.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    edit_distance(&a_chars, &b_chars, false)
}

/// Minimum edit distance between `needle` and any substring of `haystack`.
///
/// Semi-global variant of the same DP: skipping a prefix or suffix of the
/// haystack is free, so `substring_distance("song", "01. song one.flac")`
/// is 0 while plain edit distance would charge for all the surrounding text.
pub fn substring_distance(needle: &str, haystack: &str) -> usize {
    let n_chars: Vec<char> = needle.chars().collect();
    let h_chars: Vec<char> = haystack.chars().collect();
    edit_distance(&n_chars, &h_chars, true)
}

/// Two-row DP over `a` (rows) and `b` (columns). With `free_b_ends`, the
/// first row is zero (free prefix skip in `b`) and the result is the minimum
/// of the last row (free suffix skip in `b`).
fn edit_distance(a: &[char], b: &[char], free_b_ends: bool) -> usize {
    if a.is_empty() {
        return if free_b_ends { 0 } else { b.len() };
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev_row: Vec<usize> = if free_b_ends {
        vec![0; b.len() + 1]
    } else {
        (0..=b.len()).collect()
    };
    let mut curr_row: Vec<usize> = vec![0; b.len() + 1];

    for (i, a_char) in a.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, b_char) in b.iter().enumerate() {
            let cost = if a_char == b_char { 0 } else { 1 };

            curr_row[j + 1] = (prev_row[j + 1] + 1) // deletion
                .min(curr_row[j] + 1) // insertion
                .min(prev_row[j] + cost); // substitution
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    if free_b_ends {
        *prev_row.iter().min().unwrap()
    } else {
        prev_row[b.len()]
    }
}
