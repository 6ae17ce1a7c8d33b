use crate::models::ScoredPair;

/// Sorts by score descending; equal scores keep enumeration order.
pub fn rank(mut scored: Vec<ScoredPair>) -> Vec<ScoredPair> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    scored
}
