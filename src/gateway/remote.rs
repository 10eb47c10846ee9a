//! Hosted `ChatYuan` API

use super::{GatewayError, GenerationGateway, GenerationRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Stored in place of an empty completion
pub const REFUSAL: &str = "很抱歉，我无法回答这个问题";

const MAX_LENGTH: u32 = 128;
const MIN_LENGTH: u32 = 10;
const LENGTH_PENALTY: f32 = 1.0;

pub struct RemoteApiGateway {
    client: Client,
    api_url: String,
    model_name: String,
    default_api_key: Option<String>,
}

impl RemoteApiGateway {
    pub fn new(
        api_url: impl Into<String>,
        model_name: impl Into<String>,
        default_api_key: Option<String>,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| GatewayError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            model_name: model_name.into(),
            default_api_key,
        })
    }

    /// The request's key wins over the configured one; blank keys count as missing.
    fn resolve_api_key<'a>(&'a self, request: &'a GenerationRequest) -> Option<&'a str> {
        fn non_blank(key: Option<&str>) -> Option<&str> {
            key.map(str::trim).filter(|key| !key.is_empty())
        }

        non_blank(request.api_key.as_deref()).or_else(|| non_blank(self.default_api_key.as_deref()))
    }

    fn translate_request<'a>(&'a self, request: &'a GenerationRequest) -> RemoteRequest<'a> {
        RemoteRequest {
            model_name: &self.model_name,
            prompt: &request.prompt,
            generate_config: RemoteGenerateConfig {
                do_sample: true,
                top_p: request.params.top_p,
                max_length: MAX_LENGTH,
                min_length: MIN_LENGTH,
                length_penalty: LENGTH_PENALTY,
                num_beams: 1,
            },
        }
    }
}

fn normalize_response(response: RemoteResponse) -> String {
    response
        .generations
        .into_iter()
        .next()
        .map(|generation| generation.text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| REFUSAL.to_string())
}

#[async_trait]
impl GenerationGateway for RemoteApiGateway {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        let api_key = self
            .resolve_api_key(request)
            .ok_or_else(|| GatewayError::auth("An API key is required for the ChatYuan API"))?;

        let response = self
            .client
            .post(&self.api_url)
            .header("api-key", api_key)
            .json(&self.translate_request(request))
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(GatewayError::from_status(status, &body));
        }

        let parsed: RemoteResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::malformed(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Ok(normalize_response(parsed))
    }

    fn backend_id(&self) -> &str {
        "remote"
    }

    fn escapes_prompt(&self) -> bool {
        false
    }

    fn requires_api_key(&self) -> bool {
        self.default_api_key.is_none()
    }
}

// Remote API wire types

#[derive(Debug, Serialize)]
struct RemoteRequest<'a> {
    model_name: &'a str,
    prompt: &'a str,
    generate_config: RemoteGenerateConfig,
}

#[derive(Debug, Serialize)]
struct RemoteGenerateConfig {
    do_sample: bool,
    top_p: f32,
    max_length: u32,
    min_length: u32,
    length_penalty: f32,
    num_beams: u32,
}

#[derive(Debug, Deserialize)]
struct RemoteResponse {
    #[serde(default)]
    generations: Vec<RemoteGeneration>,
}

#[derive(Debug, Deserialize)]
struct RemoteGeneration {
    #[serde(default)]
    text: String,
}
