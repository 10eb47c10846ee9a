//! Conversation state and turn handling
//!
//! History storage, prompt construction and the controller that drives one
//! generation per user action.

mod controller;
mod history;
mod params;
mod prompt;

pub use controller::{ChatOutcome, ConversationController, ConversationError};
pub use history::History;
pub use params::{SamplingParams, MAX_TURNS_RANGE};
#[allow(unused_imports)] // Public API re-exports
pub use history::{EmptyHistoryError, Turn};
#[allow(unused_imports)] // Public API re-exports
pub use params::ParamsError;
#[allow(unused_imports)] // Public API re-exports
pub use prompt::{build_prompt, BOT_PREFIX, USER_PREFIX};
