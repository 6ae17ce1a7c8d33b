use crate::models::{Adjustment, Pair};

pub const PARITY_BALANCED: Adjustment = Adjustment { label: "parity balanced", delta: 0.02 };
pub const PARITY_IMBALANCED: Adjustment = Adjustment { label: "parity imbalanced", delta: -0.02 };
pub const SAME_TRAILING_DIGIT: Adjustment = Adjustment { label: "same trailing digit", delta: -0.03 };
pub const DIFFERENT_TRAILING_DIGIT: Adjustment = Adjustment {
    label: "different trailing digit",
    delta: 0.01,
};

/// Applies the parity rule then the trailing-digit rule to `raw_probability`.
///
/// The result is a ranking score, not a probability: it is not clamped to [0, 1].
pub fn score(pair: Pair, raw_probability: f64) -> (f64, Vec<Adjustment>) {
    let (a, b) = (pair.low(), pair.high());

    let parity = if a % 2 != b % 2 {
        PARITY_BALANCED
    } else {
        PARITY_IMBALANCED
    };

    let trailing = if a % 10 == b % 10 {
        SAME_TRAILING_DIGIT
    } else {
        DIFFERENT_TRAILING_DIGIT
    };

    let adjustments = vec![parity, trailing];
    let score = adjustments.iter().fold(raw_probability, |s, adj| s + adj.delta);
    (score, adjustments)
}
