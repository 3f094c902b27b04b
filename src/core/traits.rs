use async_trait::async_trait;

use super::error::CompletionError;
use crate::provider::Provider;

/// A hosted service that can turn a prompt into a completion.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Which provider this client talks to.
    fn provider(&self) -> Provider;

    /// Request a single completion for `prompt`. One attempt, no retries.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}
