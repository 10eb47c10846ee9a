//! Backend selection

use super::{GatewayError, GenerationGateway, LocalModelGateway, LoggingGateway, RemoteApiGateway};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_LOCAL_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_API_URL: &str = "https://www.clueai.cn/modelfun/api/serving_api";
pub const DEFAULT_MODEL_NAME: &str = "ChatYuan-large";

/// Which generation backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Local,
    Remote,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" | "api" => Ok(Self::Remote),
            other => Err(format!("unknown backend '{other}' (expected 'local' or 'remote')")),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Remote => "remote",
        })
    }
}

/// Configuration for the generation backend
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub backend: BackendKind,
    /// Base URL of the local model server
    pub local_url: String,
    /// Endpoint of the hosted API
    pub api_url: String,
    pub model_name: String,
    /// Fallback key when a request carries none
    pub api_key: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            local_url: DEFAULT_LOCAL_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            api_key: None,
        }
    }
}

/// Build the configured gateway, wrapped with logging.
pub fn build_gateway(config: &GatewayConfig) -> Result<Arc<dyn GenerationGateway>, GatewayError> {
    let inner: Arc<dyn GenerationGateway> = match config.backend {
        BackendKind::Local => Arc::new(LocalModelGateway::new(&config.local_url)?),
        BackendKind::Remote => Arc::new(RemoteApiGateway::new(
            config.api_url.clone(),
            config.model_name.clone(),
            config.api_key.clone(),
        )?),
    };
    Ok(Arc::new(LoggingGateway::new(inner)))
}
