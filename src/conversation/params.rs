//! Per-request sampling parameters

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest and largest history window offered by the chat page
pub const MAX_TURNS_RANGE: (usize, usize) = (4, 10);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    /// Nucleus sampling threshold
    pub top_p: f32,
    pub temperature: f32,
    /// Number of previous turns kept as context
    pub max_turns: usize,
    /// Sample from the distribution; greedy decoding when false
    pub sample: bool,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            top_p: 1.0,
            temperature: 0.7,
            max_turns: 5,
            sample: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("top_p must be between 0 and 1, got {0}")]
    TopP(f32),
    #[error("temperature must be between 0 and 1, got {0}")]
    Temperature(f32),
    #[error("max_turns must be at least 1")]
    MaxTurns,
}

impl SamplingParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(ParamsError::TopP(self.top_p));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ParamsError::Temperature(self.temperature));
        }
        if self.max_turns == 0 {
            return Err(ParamsError::MaxTurns);
        }
        Ok(())
    }
}
