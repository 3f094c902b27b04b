//! Front-end completion client: provider selection, retries, final trim.

use tracing::{debug, warn};

use super::postprocess;
use crate::core::{
    config::CompletionConfig,
    error::CompletionError,
    http::HttpClientConfig,
    retry::{RetryPolicy, retry},
    traits::CompletionProvider,
};
use crate::provider::{
    huggingface::{HuggingFaceClient, HuggingFaceConfig},
    openai::{OpenAiClient, OpenAiConfig},
};

/// Requests completions from whichever provider the configuration selects,
/// retrying failed attempts.
pub struct CompletionClient {
    config: CompletionConfig,
    retry_policy: RetryPolicy,
    http_config: HttpClientConfig,
    provider_client: Option<Box<dyn CompletionProvider>>,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            config,
            retry_policy: RetryPolicy::default(),
            http_config: HttpClientConfig::default(),
            provider_client: None,
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_http_config(mut self, http_config: HttpClientConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Use an explicit provider client instead of resolving one from the
    /// configuration keys.
    pub fn with_provider_client(mut self, client: Box<dyn CompletionProvider>) -> Self {
        self.provider_client = Some(client);
        self
    }

    /// Request a completion for `prompt`.
    ///
    /// Fails with the configuration error when no provider key is set, or
    /// when every attempt against the selected provider has failed.
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let resolved;
        let client = match &self.provider_client {
            Some(client) => client.as_ref(),
            None => match self.resolve_provider_client()? {
                Some(client) => {
                    resolved = client;
                    resolved.as_ref()
                }
                None => return Err(CompletionError::NoCompletion { source: None }),
            },
        };
        let provider = client.provider();

        let completion = match retry(&self.retry_policy, |_| client.complete(prompt)).await {
            Ok(completion) => completion,
            Err(err) => {
                warn!(%provider, error = %err, "completion attempts exhausted");
                return Err(CompletionError::NoCompletion {
                    source: Some(Box::new(err)),
                });
            }
        };

        debug!(%provider, completion = %completion, "received completion");
        Ok(postprocess::trim_overindented_continuation(&completion).to_string())
    }

    /// Build the provider client the configuration keys select.
    ///
    /// HuggingFace wins when both keys are set.
    fn resolve_provider_client(
        &self,
    ) -> Result<Option<Box<dyn CompletionProvider>>, CompletionError> {
        if let Some(api_key) = &self.config.huggingface_api_key {
            let mut config = HuggingFaceConfig::new(api_key.clone())
                .with_http_config(self.http_config.clone());
            if let Some(model) = &self.config.model {
                config = config.with_model(model.clone());
            }
            if let Some(url) = &self.config.completion_url {
                config = config.with_completion_url(url.clone());
            }
            let client: Box<dyn CompletionProvider> = Box::new(HuggingFaceClient::new(config)?);
            Ok(Some(client))
        } else if let Some(api_key) = &self.config.openai_api_key {
            let mut config =
                OpenAiConfig::new(api_key.clone()).with_http_config(self.http_config.clone());
            if let Some(model) = &self.config.model {
                config = config.with_model(model.clone());
            }
            let client: Box<dyn CompletionProvider> = Box::new(OpenAiClient::new(config)?);
            Ok(Some(client))
        } else {
            Ok(None)
        }
    }
}

/// Request a completion with configuration read from the environment.
///
/// The environment is consulted on every call, never cached.
pub async fn complete_from_env(prompt: &str) -> Result<String, CompletionError> {
    CompletionClient::new(CompletionConfig::from_env())
        .complete(prompt)
        .await
}
