use std::fmt;

use serde::Serialize;

use crate::error::{EngineError, Result};

/// Numbers drawn per period.
pub const PICK_COUNT: usize = 5;

/// Fantasy 5 draws from 1..=39.
pub const DEFAULT_MAX_NUMBER: u8 = 39;

/// Largest universe accepted for `max_number`.
pub const MAX_UNIVERSE: u8 = 99;

/// One historical result: five distinct numbers in `1..=max_number`.
///
/// A draw is a set, so the numbers are kept sorted ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Draw {
    numbers: [u8; PICK_COUNT],
}

impl Draw {
    pub fn new(numbers: &[u8], max_number: u8) -> Result<Self> {
        validate_numbers(numbers, max_number)?;
        let mut sorted = [0u8; PICK_COUNT];
        sorted.copy_from_slice(numbers);
        sorted.sort_unstable();
        Ok(Self { numbers: sorted })
    }

    pub fn numbers(&self) -> &[u8; PICK_COUNT] {
        &self.numbers
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers.contains(&number)
    }
}

impl fmt::Display for Draw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.numbers.iter().map(|n| format!("{:2}", n)).collect();
        write!(f, "{}", parts.join(" - "))
    }
}

pub fn validate_numbers(numbers: &[u8], max_number: u8) -> Result<()> {
    if numbers.len() != PICK_COUNT {
        return Err(EngineError::validation(
            "draw",
            format!("expected {} numbers, got {}", PICK_COUNT, numbers.len()),
        ));
    }
    for &n in numbers {
        if n < 1 || n > max_number {
            return Err(EngineError::validation(
                "draw",
                format!("number {} out of range 1-{}", n, max_number),
            ));
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                return Err(EngineError::validation(
                    "draw",
                    format!("duplicate number {}", numbers[i]),
                ));
            }
        }
    }
    Ok(())
}

/// Occurrence count of a number across a window of the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumberStat {
    pub number: u8,
    pub count: u32,
}

/// Unordered pair of distinct numbers, keyed as (low, high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Pair {
    low: u8,
    high: u8,
}

impl Pair {
    pub fn new(a: u8, b: u8) -> Self {
        debug_assert_ne!(a, b, "a pair needs two distinct numbers");
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn low(&self) -> u8 {
        self.low
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    /// True if either member of the pair was drawn.
    pub fn hit_by(&self, draw: &Draw) -> bool {
        draw.contains(self.low) || draw.contains(self.high)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// A labelled score delta applied by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Adjustment {
    pub label: &'static str,
    pub delta: f64,
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:+.2}", self.label, self.delta)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPair {
    pub pair: Pair,
    /// Position in enumeration order, used as the ranking tie-break.
    pub index: usize,
    pub raw_probability: f64,
    pub score: f64,
    pub adjustments: Vec<Adjustment>,
}

impl ScoredPair {
    pub fn reason(&self) -> String {
        self.adjustments
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Disjoint draws cycling through 1..=39: draw `i` holds `5i+1..=5i+5` modulo 39.
#[cfg(test)]
pub(crate) fn make_cyclic_draws(n: usize) -> Vec<Draw> {
    (0..n)
        .map(|i| {
            let start = i * PICK_COUNT;
            let numbers: Vec<u8> = (0..PICK_COUNT)
                .map(|k| ((start + k) % DEFAULT_MAX_NUMBER as usize) as u8 + 1)
                .collect();
            Draw::new(&numbers, DEFAULT_MAX_NUMBER).unwrap()
        })
        .collect()
}
