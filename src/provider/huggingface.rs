//! HuggingFace inference API completion client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::{Provider, constants::huggingface};
use crate::completions::postprocess;
use crate::core::{
    error::CompletionError,
    http::{HttpClient, HttpClientConfig},
    traits::CompletionProvider,
};

const MAX_NEW_TOKENS: u32 = 50;

/// Configuration for [`HuggingFaceClient`].
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub api_key: String,
    /// Full inference endpoint; wins over `model` when set.
    pub completion_url: Option<String>,
    pub model: Option<String>,
    /// How long to wait when the hosted model is still loading (HTTP 503)
    /// before failing the attempt.
    pub model_reload_wait: Duration,
    pub http_config: HttpClientConfig,
}

impl HuggingFaceConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            completion_url: None,
            model: None,
            model_reload_wait: Duration::from_secs(10),
            http_config: HttpClientConfig::default(),
        }
    }

    pub fn with_completion_url(mut self, completion_url: impl Into<String>) -> Self {
        self.completion_url = Some(completion_url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_model_reload_wait(mut self, wait: Duration) -> Self {
        self.model_reload_wait = wait;
        self
    }

    pub fn with_http_config(mut self, http_config: HttpClientConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Explicit override, else the configured model's inference URL, else
    /// the default model.
    fn endpoint(&self) -> String {
        match &self.completion_url {
            Some(url) => url.clone(),
            None => {
                let model = self.model.as_deref().unwrap_or(huggingface::DEFAULT_MODEL);
                format!("{}/{}", huggingface::INFERENCE_API_BASE, model)
            }
        }
    }
}

pub struct HuggingFaceClient {
    config: HuggingFaceConfig,
    http: HttpClient,
}

impl HuggingFaceClient {
    pub fn new(config: HuggingFaceConfig) -> Result<Self, CompletionError> {
        let http = HttpClient::new(&config.http_config, None)?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl CompletionProvider for HuggingFaceClient {
    fn provider(&self) -> Provider {
        Provider::HuggingFace
    }

    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = self.config.endpoint();
        let headers = [(
            "Authorization".to_string(),
            format!("Bearer {}", self.config.api_key),
        )];
        let request = InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters {
                return_full_text: false,
                max_new_tokens: MAX_NEW_TOKENS,
            },
        };

        let response = self.http.post_json(&url, &headers, &request).await?;

        if response.status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            // The hosted model is loading; give it time before the caller's
            // retry sends the next attempt.
            error!(
                wait = ?self.config.model_reload_wait,
                body = %response.body,
                "HuggingFace model is loading, sleeping"
            );
            tokio::time::sleep(self.config.model_reload_wait).await;
        }
        if response.status != reqwest::StatusCode::OK {
            error!(status = %response.status, body = %response.body, "HuggingFace API returned an error");
            return Err(CompletionError::Api {
                provider: Provider::HuggingFace,
                status: response.status.as_u16(),
                body: response.body,
            });
        }

        let parsed: Vec<GeneratedText> = response.json()?;
        let completion = parsed
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::Parse {
                message: "No generated text in response".to_string(),
                source: None,
            })?
            .generated_text;

        Ok(postprocess::truncate_at_blank_line(&completion).to_string())
    }
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    return_full_text: bool,
    max_new_tokens: u32,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}
