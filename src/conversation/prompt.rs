//! Prompt construction
//!
//! The backend keeps no memory of its own: every request carries the whole
//! retained dialogue, one role-tagged line per utterance.

use super::history::History;

pub const USER_PREFIX: &str = "用户：";
pub const BOT_PREFIX: &str = "小元：";

/// Render `history` followed by the new user input, ending with an open bot
/// line for the model to complete.
pub fn build_prompt(history: &History, input: &str) -> String {
    let context = history
        .iter()
        .map(|turn| format!("{USER_PREFIX}{}\n{BOT_PREFIX}{}", turn.user, turn.bot))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{context}\n{USER_PREFIX}{input}\n{BOT_PREFIX}")
        .trim()
        .to_string()
}
