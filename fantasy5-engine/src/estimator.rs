use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::error::{EngineError, Result};
use crate::models::{Draw, Pair};

/// Monte-Carlo estimate of how often a random subset of past draws contains a pair.
///
/// Each trial picks `sample_size` distinct draws of the window, uniformly and
/// without replacement, and counts a hit when either number of the pair
/// appears in any of them. The estimate is `hits / simulations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResamplingEstimator {
    simulations: usize,
    sample_size: usize,
}

impl ResamplingEstimator {
    pub fn new(simulations: usize, sample_size: usize) -> Self {
        Self {
            simulations,
            sample_size,
        }
    }

    pub fn estimate<R: Rng + ?Sized>(&self, window: &[Draw], pair: Pair, rng: &mut R) -> Result<f64> {
        if self.sample_size > window.len() {
            return Err(EngineError::Sampling {
                requested: self.sample_size,
                available: window.len(),
            });
        }
        if self.simulations == 0 {
            return Err(EngineError::validation("estimator", "simulations must be >= 1"));
        }

        let hit_by: Vec<bool> = window.iter().map(|d| pair.hit_by(d)).collect();

        let mut hits = 0usize;
        for _ in 0..self.simulations {
            let sample = index::sample(rng, window.len(), self.sample_size);
            if sample.iter().any(|i| hit_by[i]) {
                hits += 1;
            }
        }

        Ok(hits as f64 / self.simulations as f64)
    }
}

/// Seed of the generator owned by the pair at `index` when pairs run in parallel.
///
/// SplitMix64 finalizer over the run seed and the enumeration index, so every
/// pair gets an independent stream regardless of scheduling.
pub fn derive_seed(seed: u64, index: usize) -> u64 {
    let mut z = seed.wrapping_add((index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

pub fn pair_rng(seed: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(derive_seed(seed, index))
}
