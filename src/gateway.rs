//! Generation backend abstraction
//!
//! A gateway turns one prompt into one raw completion. The concrete backend
//! (a local model server or the hosted `ChatYuan` API) is chosen once at
//! startup by [`build_gateway`].

mod error;
mod factory;
mod local;
mod remote;
#[cfg(test)]
pub mod testing;

pub use error::{GatewayError, GatewayErrorKind};
pub use factory::{build_gateway, BackendKind, GatewayConfig};
pub use local::LocalModelGateway;
pub use remote::RemoteApiGateway;

use crate::conversation::SamplingParams;
use async_trait::async_trait;
use std::sync::Arc;

/// One generation call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Fully built prompt, already escaped if the backend asked for it
    pub prompt: String,
    pub params: SamplingParams,
    /// Per-request key for backends that need one
    pub api_key: Option<String>,
}

/// Common interface for generation backends
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Produce the raw (still escaped) completion for a prompt
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GatewayError>;

    /// Short identifier used in logs and the defaults endpoint
    fn backend_id(&self) -> &str;

    /// Whether prompts must be escaped with [`crate::codec::encode`] first
    fn escapes_prompt(&self) -> bool;

    /// Whether callers are expected to supply an API key
    fn requires_api_key(&self) -> bool {
        false
    }
}

/// Logging wrapper for gateways
pub struct LoggingGateway {
    inner: Arc<dyn GenerationGateway>,
    backend_id: String,
}

impl LoggingGateway {
    pub fn new(inner: Arc<dyn GenerationGateway>) -> Self {
        let backend_id = inner.backend_id().to_string();
        Self { inner, backend_id }
    }
}

#[async_trait]
impl GenerationGateway for LoggingGateway {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        let start = std::time::Instant::now();
        let result = self.inner.generate(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(text) => {
                tracing::info!(
                    backend = %self.backend_id,
                    duration_ms = %duration.as_millis(),
                    prompt_chars = request.prompt.chars().count(),
                    output_chars = text.chars().count(),
                    "Generation completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    backend = %self.backend_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Generation failed"
                );
            }
        }

        result
    }

    fn backend_id(&self) -> &str {
        &self.backend_id
    }

    fn escapes_prompt(&self) -> bool {
        self.inner.escapes_prompt()
    }

    fn requires_api_key(&self) -> bool {
        self.inner.requires_api_key()
    }
}
