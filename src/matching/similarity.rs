//! Character-overlap similarity used as the artist match gate.

/// Fraction of `a`'s characters that occur anywhere in `b`, in `[0, 1]`.
///
/// This is an asymmetric containment score, not an edit distance: membership
/// is not positional and not multiset-aware, so a character repeated in `a`
/// counts once per occurrence as long as `b` contains it at all. An empty `a`
/// scores 0.0 so the function stays total; callers should skip empty keys
/// before gating on it.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    if a_chars.is_empty() {
        return 0.0;
    }

    let b_chars: Vec<char> = b.chars().collect();
    let matched = a_chars.iter().filter(|c| b_chars.contains(c)).count();

    matched as f64 / a_chars.len() as f64
}
