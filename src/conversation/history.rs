//! Bounded conversation history
//!
//! History is a plain value: every operation consumes it and hands back a new
//! one. The caller (ultimately the UI) holds the authoritative copy between
//! requests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One exchange. Both sides hold decoded, human-readable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub user: String,
    pub bot: String,
}

impl Turn {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
        }
    }
}

/// Returned by [`History::drop_last`] when there is nothing to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("conversation history is empty")]
pub struct EmptyHistoryError;

/// Turns in chronological order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<Turn>);

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh conversation
    pub fn clear() -> Self {
        Self::new()
    }

    #[must_use]
    pub fn append(mut self, user: impl Into<String>, bot: impl Into<String>) -> Self {
        self.0.push(Turn::new(user, bot));
        self
    }

    /// Keep only the most recent `max_turns` turns.
    #[must_use]
    pub fn truncate(mut self, max_turns: usize) -> Self {
        let excess = self.0.len().saturating_sub(max_turns);
        if excess > 0 {
            self.0.drain(..excess);
        }
        self
    }

    /// Remove the final turn, returning its user text and the shortened history.
    pub fn drop_last(mut self) -> Result<(String, Self), EmptyHistoryError> {
        let last = self.0.pop().ok_or(EmptyHistoryError)?;
        Ok((last.user, self))
    }

    #[allow(dead_code)] // Accessor for API completeness
    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    #[allow(dead_code)] // Accessor for API completeness
    pub fn last(&self) -> Option<&Turn> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[allow(dead_code)] // Accessor for API completeness
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.0.iter()
    }
}

impl FromIterator<Turn> for History {
    fn from_iter<I: IntoIterator<Item = Turn>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
