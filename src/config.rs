//! Process configuration from the environment

use crate::gateway::{BackendKind, GatewayConfig};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 7860;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("YUAN_PORT must be a port number, got '{0}'")]
    Port(String),
    #[error("YUAN_BACKEND: {0}")]
    Backend(String),
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub port: u16,
    pub gateway: GatewayConfig,
    /// Prepended to every prompt
    pub preamble: String,
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; unset and blank values take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = GatewayConfig::default();

        let port = match var("YUAN_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Port(raw))?,
            None => DEFAULT_PORT,
        };

        let backend = match var("YUAN_BACKEND") {
            Some(raw) => raw.parse::<BackendKind>().map_err(ConfigError::Backend)?,
            None => BackendKind::default(),
        };

        Ok(Self {
            port,
            gateway: GatewayConfig {
                backend,
                local_url: var("YUAN_LOCAL_URL").unwrap_or(defaults.local_url),
                api_url: var("CLUEAI_API_URL").unwrap_or(defaults.api_url),
                model_name: var("CLUEAI_MODEL").unwrap_or(defaults.model_name),
                api_key: var("CLUEAI_API_KEY"),
            },
            preamble: lookup("YUAN_PREAMBLE").unwrap_or_default(),
        })
    }
}
