use std::collections::BTreeSet;

use serde::Serialize;

use crate::history::History;
use crate::models::{Draw, NumberStat};

/// Only the most frequent numbers of the window compete for the hot set.
pub const HOT_CANDIDATES: usize = 20;

/// A number seen this many times in the over-heat window is over-hot.
pub const OVER_HOT_THRESHOLD: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotSet {
    /// Hot numbers in frequency-rank order.
    pub numbers: Vec<u8>,
    /// Numbers excluded for appearing too often in the over-heat window.
    pub over_hot: BTreeSet<u8>,
}

/// Occurrence count of every number of `1..=max_number` in `window`, in numeric order.
pub fn count_numbers(window: &[Draw], max_number: u8) -> Vec<NumberStat> {
    let mut stats: Vec<NumberStat> = (1..=max_number)
        .map(|n| NumberStat { number: n, count: 0 })
        .collect();

    for draw in window {
        for &n in draw.numbers() {
            let idx = (n - 1) as usize;
            if idx < stats.len() {
                stats[idx].count += 1;
            }
        }
    }

    stats
}

/// Numbers that occurred at least once, most frequent first; ties by ascending number.
pub fn rank_by_frequency(stats: &[NumberStat]) -> Vec<NumberStat> {
    let mut ranked: Vec<NumberStat> = stats.iter().copied().filter(|s| s.count > 0).collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.number.cmp(&b.number)));
    ranked
}

/// Numbers drawn at least twice within the first `exclude_recent` draws of `window`.
pub fn over_hot(window: &[Draw], exclude_recent: usize, max_number: u8) -> BTreeSet<u8> {
    let recent = &window[..exclude_recent.min(window.len())];
    count_numbers(recent, max_number)
        .into_iter()
        .filter(|s| s.count >= OVER_HOT_THRESHOLD)
        .map(|s| s.number)
        .collect()
}

/// Hot set of the `recent_n` most recent draws, over-hot numbers removed.
pub fn analyze(history: &History, recent_n: usize, exclude_recent: usize, top_n: usize) -> HotSet {
    let window = history.window(recent_n);
    let max_number = history.max_number();

    let ranked = rank_by_frequency(&count_numbers(window, max_number));
    let over_hot = over_hot(window, exclude_recent, max_number);

    let numbers: Vec<u8> = ranked
        .iter()
        .take(HOT_CANDIDATES)
        .map(|s| s.number)
        .filter(|n| !over_hot.contains(n))
        .take(top_n)
        .collect();

    log::debug!(
        "hot set over {} draws: {:?} (over-hot excluded: {:?})",
        window.len(),
        numbers,
        over_hot
    );

    HotSet { numbers, over_hot }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::make_cyclic_draws;

    fn history(records: &[[u8; 5]]) -> History {
        History::from_numbers(records.iter(), 39).unwrap()
    }

    #[test]
    fn test_count_numbers() {
        let h = history(&[[1, 2, 3, 4, 5], [1, 2, 6, 7, 8]]);
        let stats = count_numbers(h.draws(), 39);
        assert_eq!(stats.len(), 39);
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[5].count, 1);
        assert_eq!(stats[38].count, 0);
    }

    #[test]
    fn test_rank_ties_by_number() {
        let h = history(&[[9, 2, 3, 4, 5], [9, 8, 7, 6, 1]]);
        let ranked = rank_by_frequency(&count_numbers(h.draws(), 39));
        assert_eq!(ranked[0].number, 9);
        let rest: Vec<u8> = ranked[1..].iter().map(|s| s.number).collect();
        assert_eq!(rest, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_over_hot_only_in_recent_window() {
        let h = history(&[
            [1, 2, 3, 4, 5],
            [1, 6, 7, 8, 9],
            [2, 10, 11, 12, 13],
            [2, 14, 15, 16, 17],
        ]);
        assert_eq!(over_hot(h.draws(), 2, 39), BTreeSet::from([1]));
        assert_eq!(over_hot(h.draws(), 4, 39), BTreeSet::from([1, 2]));
    }

    #[test]
    fn test_analyze_excludes_over_hot() {
        let h = history(&[
            [1, 2, 3, 4, 5],
            [1, 2, 6, 7, 8],
            [1, 3, 6, 9, 10],
            [3, 6, 11, 12, 13],
        ]);
        // counts: 1,3,6 -> 3; 2 -> 2; over-hot in first 2 draws: 1,2
        let hot = analyze(&h, 4, 2, 3);
        assert_eq!(hot.numbers, vec![3, 6, 4]);
        assert_eq!(hot.over_hot, BTreeSet::from([1, 2]));
    }

    #[test]
    fn test_analyze_respects_top_n_and_window() {
        let h = History::from_draws(make_cyclic_draws(30), 39).unwrap();
        for top_n in 1..=25 {
            let hot = analyze(&h, 12, 3, top_n);
            assert!(hot.numbers.len() <= top_n);
            assert!(hot.numbers.iter().all(|n| !hot.over_hot.contains(n)));
        }
    }

    #[test]
    fn test_only_twenty_candidates() {
        // 1..=20 drawn twice, 21..=25 once.
        let records = [
            [1, 2, 3, 4, 5],
            [6, 7, 8, 9, 10],
            [11, 12, 13, 14, 15],
            [16, 17, 18, 19, 20],
            [1, 2, 3, 4, 5],
            [6, 7, 8, 9, 10],
            [11, 12, 13, 14, 15],
            [16, 17, 18, 19, 20],
            [21, 22, 23, 24, 25],
        ];
        let hot = analyze(&history(&records), 9, 1, 25);
        assert_eq!(hot.numbers.len(), HOT_CANDIDATES);
        assert!(!hot.numbers.contains(&21));
    }

    #[test]
    fn test_everything_over_hot_gives_empty_set() {
        let h = history(&[[1, 2, 3, 4, 5], [1, 2, 3, 4, 5], [1, 2, 3, 4, 5]]);
        let hot = analyze(&h, 3, 3, 4);
        assert!(hot.numbers.is_empty());
    }
}
