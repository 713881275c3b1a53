//! String matching primitives for the reconciliation engine.

mod levenshtein;
mod similarity;

pub use levenshtein::{levenshtein_distance, substring_distance};
pub use similarity::similarity;
