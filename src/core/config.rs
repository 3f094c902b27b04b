//! Completion configuration, usually snapshotted from the environment.

use std::env;

use crate::provider::{Provider, constants};

/// Environment variable naming the model to use (both providers).
pub const MODEL_ENV_VAR: &str = "COMPLETION_MODEL";

/// Environment variable overriding the HuggingFace inference endpoint.
pub const COMPLETION_URL_ENV_VAR: &str = "COMPLETION_URL";

/// Settings for a completion request.
///
/// Built explicitly, or snapshotted from the process environment with
/// [`CompletionConfig::from_env`]. The caller owns the value; nothing in the
/// crate reads the environment behind its back.
#[derive(Debug, Clone, Default)]
pub struct CompletionConfig {
    pub openai_api_key: Option<String>,
    pub huggingface_api_key: Option<String>,
    /// Model name; defaults are provider-specific.
    pub model: Option<String>,
    /// Full HuggingFace inference endpoint, overriding the model-derived URL.
    pub completion_url: Option<String>,
}

impl CompletionConfig {
    /// Read the configuration from the environment.
    ///
    /// Consults `OPENAI_API_KEY`, `HUGGINGFACE_API_KEY`, `COMPLETION_MODEL`
    /// and `COMPLETION_URL` at call time; nothing is cached. Empty values
    /// count as unset.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: read_var(constants::openai::API_KEY_ENV_VAR),
            huggingface_api_key: read_var(constants::huggingface::API_KEY_ENV_VAR),
            model: read_var(MODEL_ENV_VAR),
            completion_url: read_var(COMPLETION_URL_ENV_VAR),
        }
    }

    pub fn with_openai_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.openai_api_key = Some(api_key.into());
        self
    }

    pub fn with_huggingface_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.huggingface_api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_completion_url(mut self, completion_url: impl Into<String>) -> Self {
        self.completion_url = Some(completion_url.into());
        self
    }

    /// The provider a completion request will use, if any key is set.
    ///
    /// Selection is mutually exclusive: HuggingFace wins when both keys are
    /// present, otherwise whichever provider has a key.
    pub fn provider(&self) -> Option<Provider> {
        if self.huggingface_api_key.is_some() {
            Some(Provider::HuggingFace)
        } else if self.openai_api_key.is_some() {
            Some(Provider::OpenAi)
        } else {
            None
        }
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}
