//! OpenAI completion client.
//!
//! Chat-style models (anything with `turbo` in the name) go through the chat
//! completions endpoint with a fixed system instruction; everything else uses
//! the legacy completions endpoint with the raw prompt.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::{Provider, constants::openai};
use crate::completions::postprocess;
use crate::core::{
    error::CompletionError,
    http::{HttpClient, HttpClientConfig},
    traits::CompletionProvider,
};

const MAX_TOKENS: u32 = 150;
const TEMPERATURE: f32 = 0.0;
const STOP_SEQUENCE: &str = "\n\n";

/// Instruction sent ahead of the user prompt in chat mode. The formula
/// environment is Python-like, with `rec` in place of `self`.
const CHAT_SYSTEM_INSTRUCTION: &str = "The user gives you one or more Python classes, \
with one last method that needs completing. Write the method body as a single code block, \
including the docstring the user gave. Just give the Python code as a markdown block, \
do not give any introduction, that will just be awkward for the user when copying and pasting. \
You are working with a spreadsheet document engine, an environment very like regular Python \
except `rec` (like record) is used instead of `self`. Include at least one `return` statement \
or the method will fail, disappointing the user. Your answer should be the body of a single \
method, not a class, and should not include `dataclass` or `class` since the user is counting \
on you to provide a single method. Thanks!";

/// Configuration for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub http_config: HttpClientConfig,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: openai::API_BASE.to_string(),
            model: openai::DEFAULT_MODEL.to_string(),
            http_config: HttpClientConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_http_config(mut self, http_config: HttpClientConfig) -> Self {
        self.http_config = http_config;
        self
    }

    fn chat_mode(&self) -> bool {
        self.model.contains("turbo")
    }

    fn endpoint(&self) -> &'static str {
        if self.chat_mode() {
            openai::CHAT_COMPLETIONS_ENDPOINT
        } else {
            openai::COMPLETIONS_ENDPOINT
        }
    }
}

pub struct OpenAiClient {
    config: OpenAiConfig,
    http: HttpClient,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, CompletionError> {
        let http = HttpClient::new(&config.http_config, None)?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = format!("{}{}", self.config.base_url, self.config.endpoint());
        let headers = [(
            "Authorization".to_string(),
            format!("Bearer {}", self.config.api_key),
        )];

        let response = if self.config.chat_mode() {
            let request = ChatRequest {
                model: &self.config.model,
                messages: [
                    RequestMessage {
                        role: "system",
                        content: CHAT_SYSTEM_INSTRUCTION,
                    },
                    RequestMessage {
                        role: "user",
                        content: prompt,
                    },
                ],
                max_tokens: MAX_TOKENS,
                temperature: TEMPERATURE,
                stop: [STOP_SEQUENCE],
            };
            self.http.post_json(&url, &headers, &request).await?
        } else {
            let request = LegacyRequest {
                model: &self.config.model,
                prompt,
                max_tokens: MAX_TOKENS,
                temperature: TEMPERATURE,
                stop: [STOP_SEQUENCE],
            };
            self.http.post_json(&url, &headers, &request).await?
        };

        if response.status != reqwest::StatusCode::OK {
            error!(status = %response.status, body = %response.body, "OpenAI API returned an error");
            return Err(CompletionError::Api {
                provider: Provider::OpenAi,
                status: response.status.as_u16(),
                body: response.body,
            });
        }

        if self.config.chat_mode() {
            let parsed: ChatResponse = response.json()?;
            let choice = parsed
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| missing_field("No choices in chat response"))?;
            Ok(clean_chat_completion(&choice.message.content))
        } else {
            let parsed: LegacyResponse = response.json()?;
            let choice = parsed
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| missing_field("No choices in completion response"))?;
            Ok(choice.text)
        }
    }
}

fn missing_field(message: &str) -> CompletionError {
    CompletionError::Parse {
        message: message.to_string(),
        source: None,
    }
}

/// Chat answers arrive wrapped in a markdown fence and often re-quote the
/// docstring; keep only the code that follows.
fn clean_chat_completion(content: &str) -> String {
    let unfenced = postprocess::strip_code_fence(content);
    postprocess::strip_docstring_framing(&unfenced).to_string()
}

#[derive(Serialize)]
struct LegacyRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    stop: [&'a str; 1],
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [RequestMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    stop: [&'a str; 1],
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct LegacyResponse {
    choices: Vec<LegacyChoice>,
}

#[derive(Deserialize)]
struct LegacyChoice {
    text: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}
