pub(crate) mod constants;
pub(crate) mod huggingface;
pub(crate) mod openai;

pub use huggingface::{HuggingFaceClient, HuggingFaceConfig};
pub use openai::{OpenAiClient, OpenAiConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    HuggingFace,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "OpenAI"),
            Provider::HuggingFace => write!(f, "HuggingFace"),
        }
    }
}

impl Provider {
    /// Get the default environment variable name for this provider's API key
    pub fn default_api_key_env_var(&self) -> &'static str {
        match self {
            Provider::OpenAi => constants::openai::API_KEY_ENV_VAR,
            Provider::HuggingFace => constants::huggingface::API_KEY_ENV_VAR,
        }
    }
}
