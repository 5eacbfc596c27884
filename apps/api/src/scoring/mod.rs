// Compatibility scoring between a structured profile and structured requirements.

pub mod calculator;
pub mod prompts;

pub use calculator::ScoreCalculator;
