//! HTTP API for the chat page
//!
//! Every endpoint is stateless: the client sends the current history with each
//! action and replaces it with the one that comes back.

mod assets;
mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::conversation::ConversationController;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ConversationController>,
}

impl AppState {
    pub fn new(controller: ConversationController) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }
}
