use crate::error::{EngineError, Result};
use crate::models::{Draw, MAX_UNIVERSE, PICK_COUNT};

/// Ordered draw history, `draws()[0]` being the most recent.
///
/// Built once from validated records and only read during an analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    draws: Vec<Draw>,
    max_number: u8,
}

impl History {
    /// Validates raw records (most recent first) against `1..=max_number`.
    pub fn from_numbers<I, T>(records: I, max_number: u8) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        check_universe(max_number)?;
        let draws = records
            .into_iter()
            .enumerate()
            .map(|(i, rec)| Draw::new(rec.as_ref(), max_number).map_err(|e| at_record(i, e)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { draws, max_number })
    }

    /// Wraps already-built draws, re-checking them against `max_number`.
    pub fn from_draws(draws: Vec<Draw>, max_number: u8) -> Result<Self> {
        check_universe(max_number)?;
        for (i, draw) in draws.iter().enumerate() {
            if let Some(&n) = draw.numbers().iter().find(|&&n| n > max_number) {
                return Err(EngineError::validation(
                    "draw",
                    format!("record {}: number {} out of range 1-{}", i, n, max_number),
                ));
            }
        }
        Ok(Self { draws, max_number })
    }

    /// Adds draws newer than everything already held. `newer[0]` becomes the most recent.
    ///
    /// For callers that keep their history in memory between runs; the SQLite
    /// store extends history on disk instead.
    pub fn prepend(&mut self, newer: Vec<Draw>) -> Result<()> {
        let extended = Self::from_draws(newer, self.max_number)?;
        let mut draws = extended.draws;
        draws.append(&mut self.draws);
        self.draws = draws;
        Ok(())
    }

    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    /// The `n` most recent draws, or the whole history if it is shorter.
    pub fn window(&self, n: usize) -> &[Draw] {
        &self.draws[..n.min(self.draws.len())]
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn max_number(&self) -> u8 {
        self.max_number
    }
}

pub(crate) fn check_universe(max_number: u8) -> Result<()> {
    if (max_number as usize) < PICK_COUNT || max_number > MAX_UNIVERSE {
        return Err(EngineError::validation(
            "universe",
            format!("max_number {} outside {}-{}", max_number, PICK_COUNT, MAX_UNIVERSE),
        ));
    }
    Ok(())
}

fn at_record(index: usize, err: EngineError) -> EngineError {
    match err {
        EngineError::Validation { what, detail } => EngineError::Validation {
            what,
            detail: format!("record {}: {}", index, detail),
        },
        other => other,
    }
}
