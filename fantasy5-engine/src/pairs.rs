use crate::models::Pair;

/// All unordered pairs of `hot`, in combination order: (0,1), (0,2), ..., (1,2), ...
pub fn enumerate_pairs(hot: &[u8]) -> Vec<Pair> {
    let n = hot.len();
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            pairs.push(Pair::new(hot[i], hot[j]));
        }
    }
    pairs
}
