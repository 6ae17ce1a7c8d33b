pub mod config;
pub mod error;
pub mod estimator;
pub mod frequency;
pub mod history;
pub mod models;
pub mod pairs;
pub mod ranker;
pub mod scorer;
pub mod strategy;

pub use config::StrategyConfig;
pub use error::EngineError;
pub use history::History;
pub use strategy::{run_strategy, run_strategy_with_progress, Analysis};
