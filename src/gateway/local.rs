//! Locally hosted model server
//!
//! Talks to a text-generation server running next to this process (the model
//! weights stay there). One `POST {base}/generate` per request.

use super::{GatewayError, GenerationGateway, GenerationRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Output budget, independent of prompt length
const MAX_NEW_TOKENS: u32 = 1024;
/// Window used to keep sampled output from looping
const NO_REPEAT_NGRAM_SIZE: u32 = 12;
const GREEDY_LENGTH_PENALTY: f32 = 0.6;

/// T5 control tokens that may leak into decoded output
const SPECIAL_TOKENS: [&str; 3] = ["<pad>", "</s>", "<unk>"];

pub struct LocalModelGateway {
    client: Client,
    endpoint: String,
}

impl LocalModelGateway {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| GatewayError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/generate", base_url.trim_end_matches('/')),
        })
    }

    fn options(request: &GenerationRequest) -> GenerateOptions {
        let params = &request.params;
        if params.sample {
            GenerateOptions {
                do_sample: true,
                top_p: Some(params.top_p),
                temperature: Some(params.temperature),
                no_repeat_ngram_size: Some(NO_REPEAT_NGRAM_SIZE),
                num_beams: None,
                length_penalty: None,
                max_new_tokens: MAX_NEW_TOKENS,
                skip_special_tokens: true,
            }
        } else {
            GenerateOptions {
                do_sample: false,
                top_p: None,
                temperature: None,
                no_repeat_ngram_size: None,
                num_beams: Some(1),
                length_penalty: Some(GREEDY_LENGTH_PENALTY),
                max_new_tokens: MAX_NEW_TOKENS,
                skip_special_tokens: true,
            }
        }
    }
}

fn strip_special_tokens(text: &str) -> String {
    SPECIAL_TOKENS
        .iter()
        .fold(text.to_string(), |acc, token| acc.replace(token, ""))
        .trim()
        .to_string()
}

#[async_trait]
impl GenerationGateway for LocalModelGateway {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        let body = GenerateRequest {
            inputs: &request.prompt,
            parameters: Self::options(request),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(GatewayError::from_status(status, &text));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text).map_err(|e| {
            GatewayError::malformed(format!("Failed to parse response: {e} - body: {text}"))
        })?;

        parsed
            .sequences
            .first()
            .map(String::as_str)
            .map(strip_special_tokens)
            .ok_or_else(|| GatewayError::malformed("Model server returned no sequences"))
    }

    fn backend_id(&self) -> &str {
        "local"
    }

    fn escapes_prompt(&self) -> bool {
        true
    }
}

// Model server wire types

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    do_sample: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    no_repeat_ngram_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_beams: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    length_penalty: Option<f32>,
    max_new_tokens: u32,
    skip_special_tokens: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    sequences: Vec<String>,
}
