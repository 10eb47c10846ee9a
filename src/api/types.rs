//! API request and response types

use crate::conversation::{History, SamplingParams};
use serde::{Deserialize, Serialize};

/// Body of the send and regenerate actions
///
/// `history` is whatever the previous response returned; the server keeps no
/// copy of it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TurnRequest {
    pub input: String,
    pub history: History,
    pub params: SamplingParams,
    pub api_key: Option<String>,
}

/// Initial values for the chat page controls
#[derive(Debug, Serialize)]
pub struct DefaultsResponse {
    pub params: SamplingParams,
    pub max_turns_range: [usize; 2],
    pub backend: String,
    pub requires_api_key: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
