use anyhow::Result;

use fantasy5_engine::models::Draw;

/// A draw as kept in the local history, keyed by its date (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDraw {
    pub date: String,
    pub draw: Draw,
}

impl StoredDraw {
    pub fn new(date: impl Into<String>, numbers: &[u8], max_number: u8) -> Result<Self> {
        Ok(Self {
            date: date.into(),
            draw: Draw::new(numbers, max_number)?,
        })
    }
}
