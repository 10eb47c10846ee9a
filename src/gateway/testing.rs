//! Mock gateway for testing
//!
//! Returns queued responses in order and records every request it sees.

use super::{GatewayError, GenerationGateway, GenerationRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

pub struct MockGateway {
    responses: Mutex<VecDeque<Result<String, GatewayError>>>,
    backend_id: String,
    escapes_prompt: bool,
    /// Record of all requests made
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl MockGateway {
    pub fn new(backend_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            backend_id: backend_id.into(),
            escapes_prompt: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn escaping(mut self, escapes_prompt: bool) -> Self {
        self.escapes_prompt = escapes_prompt;
        self
    }

    pub fn queue_response(&self, text: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn queue_error(&self, error: GatewayError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationGateway for MockGateway {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::network("No mock response queued")))
    }

    fn backend_id(&self) -> &str {
        &self.backend_id
    }

    fn escapes_prompt(&self) -> bool {
        self.escapes_prompt
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
