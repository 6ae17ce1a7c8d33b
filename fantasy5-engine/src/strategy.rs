use std::sync::atomic::{AtomicUsize, Ordering};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::StrategyConfig;
use crate::error::{EngineError, Result};
use crate::estimator::{pair_rng, ResamplingEstimator};
use crate::frequency::{analyze, count_numbers, rank_by_frequency, HotSet};
use crate::history::History;
use crate::models::{NumberStat, Pair, ScoredPair};
use crate::pairs::enumerate_pairs;
use crate::ranker::rank;
use crate::scorer;

/// Everything one run produces, handed to the display/export layer.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Number of draws actually analysed (`min(recent_n, history length)`).
    pub window_len: usize,
    /// Window frequencies, most frequent first.
    pub stats: Vec<NumberStat>,
    pub hot_set: HotSet,
    pub ranking: Vec<ScoredPair>,
}

pub fn run_strategy(history: &History, config: &StrategyConfig) -> Result<Analysis> {
    run_strategy_with_progress(history, config, |_, _| {})
}

/// Runs the full pipeline. `on_pair(done, total)` is called after each pair is estimated.
pub fn run_strategy_with_progress<F>(history: &History, config: &StrategyConfig, on_pair: F) -> Result<Analysis>
where
    F: Fn(usize, usize) + Sync,
{
    config.validate()?;
    if history.max_number() != config.max_number {
        return Err(EngineError::validation(
            "config",
            format!(
                "history drawn from 1-{} but max_number is {}",
                history.max_number(),
                config.max_number
            ),
        ));
    }

    let window = history.window(config.recent_n);
    let required = config.required_history();
    if window.len() < required {
        return Err(EngineError::InsufficientData {
            available: window.len(),
            required,
        });
    }

    let stats = rank_by_frequency(&count_numbers(window, config.max_number));
    let hot_set = analyze(history, config.recent_n, config.exclude_recent, config.top_n);
    let pairs = enumerate_pairs(&hot_set.numbers);
    let total = pairs.len();

    log::info!(
        "{} draws analysed, {} hot numbers, {} pairs x {} simulations (seed {}, {})",
        window.len(),
        hot_set.numbers.len(),
        total,
        config.simulations,
        config.seed,
        if config.parallel { "parallel" } else { "sequential" }
    );

    let estimator = ResamplingEstimator::new(config.simulations, config.sample_size);
    let done = AtomicUsize::new(0);
    let finish = |index: usize, pair: Pair, raw_probability: f64| {
        on_pair(done.fetch_add(1, Ordering::Relaxed) + 1, total);
        log::debug!("pair {} (#{}): p = {:.4}", pair, index, raw_probability);
        let (score, adjustments) = scorer::score(pair, raw_probability);
        ScoredPair {
            pair,
            index,
            raw_probability,
            score,
            adjustments,
        }
    };

    let scored: Vec<ScoredPair> = if config.parallel {
        pairs
            .par_iter()
            .enumerate()
            .map(|(i, &pair)| -> Result<ScoredPair> {
                let mut rng = pair_rng(config.seed, i);
                let p = estimator.estimate(window, pair, &mut rng)?;
                Ok(finish(i, pair, p))
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        let mut rng = StdRng::seed_from_u64(config.seed);
        pairs
            .iter()
            .enumerate()
            .map(|(i, &pair)| -> Result<ScoredPair> {
                let p = estimator.estimate(window, pair, &mut rng)?;
                Ok(finish(i, pair, p))
            })
            .collect::<Result<Vec<_>>>()?
    };

    Ok(Analysis {
        window_len: window.len(),
        stats,
        hot_set,
        ranking: rank(scored),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::make_cyclic_draws;

    fn scenario_config() -> StrategyConfig {
        StrategyConfig {
            recent_n: 12,
            top_n: 4,
            exclude_recent: 2,
            simulations: 1000,
            sample_size: 3,
            seed: 1,
            ..Default::default()
        }
    }

    fn cyclic_history(n: usize) -> History {
        History::from_draws(make_cyclic_draws(n), 39).unwrap()
    }

    #[test]
    fn test_twelve_cyclic_draws_scenario() {
        let history = cyclic_history(12);
        let analysis = run_strategy(&history, &scenario_config()).unwrap();

        assert_eq!(analysis.window_len, 12);
        assert_eq!(analysis.hot_set.numbers.len(), 4);
        let recent = &history.draws()[..2];
        for &n in &analysis.hot_set.numbers {
            let seen = recent.iter().filter(|d| d.contains(n)).count();
            assert!(seen < 2, "{} is over-hot", n);
        }

        assert_eq!(analysis.ranking.len(), 6);
        for w in analysis.ranking.windows(2) {
            assert!(w[0].score >= w[1].score);
        }
        for sp in &analysis.ranking {
            assert!(!sp.reason().is_empty());
            assert!((0.0..=1.0).contains(&sp.raw_probability));
        }
    }

    #[test]
    fn test_reproducible_with_same_seed() {
        let history = cyclic_history(20);
        let config = StrategyConfig { recent_n: 20, top_n: 6, ..scenario_config() };
        let a = run_strategy(&history, &config).unwrap();
        let b = run_strategy(&history, &config).unwrap();
        assert_eq!(a.ranking, b.ranking);
    }

    #[test]
    fn test_parallel_is_reproducible() {
        let history = cyclic_history(20);
        let config = StrategyConfig {
            recent_n: 20,
            top_n: 6,
            parallel: true,
            ..scenario_config()
        };
        let a = run_strategy(&history, &config).unwrap();
        let b = run_strategy(&history, &config).unwrap();
        assert_eq!(a.ranking, b.ranking);
        assert_eq!(a.ranking.len(), 15);
    }

    fn probabilities_by_index(analysis: &Analysis) -> Vec<u64> {
        let mut by_index: Vec<(usize, u64)> = analysis
            .ranking
            .iter()
            .map(|sp| (sp.index, sp.raw_probability.to_bits()))
            .collect();
        by_index.sort();
        by_index.into_iter().map(|(_, bits)| bits).collect()
    }

    #[test]
    fn test_sequential_consumes_one_generator_in_pair_order() {
        let history = cyclic_history(20);
        let config = StrategyConfig { recent_n: 20, top_n: 6, ..scenario_config() };
        let analysis = run_strategy(&history, &config).unwrap();

        let window = history.window(config.recent_n);
        let hot = analyze(&history, config.recent_n, config.exclude_recent, config.top_n);
        let estimator = ResamplingEstimator::new(config.simulations, config.sample_size);
        let mut rng = StdRng::seed_from_u64(config.seed);
        let expected: Vec<u64> = enumerate_pairs(&hot.numbers)
            .into_iter()
            .map(|pair| estimator.estimate(window, pair, &mut rng).unwrap().to_bits())
            .collect();

        assert_eq!(expected.len(), 15);
        assert_eq!(probabilities_by_index(&analysis), expected);
    }

    #[test]
    fn test_parallel_uses_derived_generator_per_pair() {
        let history = cyclic_history(20);
        let config = StrategyConfig {
            recent_n: 20,
            top_n: 6,
            parallel: true,
            ..scenario_config()
        };
        let analysis = run_strategy(&history, &config).unwrap();

        let window = history.window(config.recent_n);
        let hot = analyze(&history, config.recent_n, config.exclude_recent, config.top_n);
        let estimator = ResamplingEstimator::new(config.simulations, config.sample_size);
        let expected: Vec<u64> = enumerate_pairs(&hot.numbers)
            .into_iter()
            .enumerate()
            .map(|(i, pair)| {
                let mut rng = pair_rng(config.seed, i);
                estimator.estimate(window, pair, &mut rng).unwrap().to_bits()
            })
            .collect();

        assert_eq!(probabilities_by_index(&analysis), expected);
    }

    #[test]
    fn test_insufficient_history() {
        let history = cyclic_history(8);
        let err = run_strategy(&history, &StrategyConfig { recent_n: 8, ..scenario_config() }).unwrap_err();
        assert_eq!(err, EngineError::InsufficientData { available: 8, required: 10 });
    }

    #[test]
    fn test_window_limited_by_recent_n() {
        // 30 draws stored but only 9 analysed
        let history = cyclic_history(30);
        let err = run_strategy(&history, &StrategyConfig { recent_n: 9, ..scenario_config() }).unwrap_err();
        assert_eq!(err, EngineError::InsufficientData { available: 9, required: 10 });
    }

    #[test]
    fn test_invalid_config_rejected_before_data_check() {
        let history = cyclic_history(3);
        let config = StrategyConfig { exclude_recent: 13, ..scenario_config() };
        assert!(matches!(run_strategy(&history, &config), Err(EngineError::Validation { .. })));
    }

    #[test]
    fn test_universe_mismatch() {
        let history = cyclic_history(12);
        let config = StrategyConfig { max_number: 50, ..scenario_config() };
        assert!(matches!(run_strategy(&history, &config), Err(EngineError::Validation { .. })));
    }

    #[test]
    fn test_all_over_hot_gives_empty_ranking() {
        let records = vec![[1u8, 2, 3, 4, 5]; 10];
        let history = History::from_numbers(records, 39).unwrap();
        let config = StrategyConfig { recent_n: 10, exclude_recent: 10, ..scenario_config() };
        let analysis = run_strategy(&history, &config).unwrap();
        assert!(analysis.hot_set.numbers.is_empty());
        assert!(analysis.ranking.is_empty());
    }

    #[test]
    fn test_sample_whole_window_ignores_seed() {
        let history = cyclic_history(10);
        let base = StrategyConfig { recent_n: 10, sample_size: 10, simulations: 50, ..scenario_config() };
        let a = run_strategy(&history, &StrategyConfig { seed: 1, ..base.clone() }).unwrap();
        let b = run_strategy(&history, &StrategyConfig { seed: 999, ..base }).unwrap();
        assert_eq!(a.ranking, b.ranking);
        for sp in &a.ranking {
            assert!(sp.raw_probability == 0.0 || sp.raw_probability == 1.0);
        }
    }

    #[test]
    fn test_progress_reports_every_pair() {
        let history = cyclic_history(12);
        let calls = AtomicUsize::new(0);
        let analysis = run_strategy_with_progress(&history, &scenario_config(), |done, total| {
            assert!(done <= total);
            calls.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), analysis.ranking.len());
    }
}
