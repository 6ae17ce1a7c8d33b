use thiserror::Error;

/// Failure of an analysis run. Every variant is fatal for the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid {what}: {detail}")]
    Validation { what: &'static str, detail: String },

    #[error("insufficient history: {available} draws available, at least {required} required")]
    InsufficientData { available: usize, required: usize },

    #[error("cannot sample {requested} draws from a window of {available}")]
    Sampling { requested: usize, available: usize },
}

impl EngineError {
    pub(crate) fn validation(what: &'static str, detail: impl Into<String>) -> Self {
        EngineError::Validation {
            what,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
