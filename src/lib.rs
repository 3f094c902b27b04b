//! # formulai
//!
//! AI formula completion for spreadsheet-style documents.
//!
//! Sends a code-completion prompt to a hosted completion provider (OpenAI or
//! the HuggingFace inference API), retries failed attempts, and trims the
//! returned text down to a usable formula body. Prompts for formula columns
//! can be assembled from table schemas with the [`prompt`] module.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use formulai::{CompletionClient, CompletionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CompletionClient::new(CompletionConfig::from_env());
//!     let completion = client
//!         .complete("    @property\n    def Total(self) -> float:\n")
//!         .await?;
//!     println!("{completion}");
//!     Ok(())
//! }
//! ```
//!
//! Configuration comes from `OPENAI_API_KEY`, `HUGGINGFACE_API_KEY`,
//! `COMPLETION_MODEL` and `COMPLETION_URL`, or is built explicitly with the
//! [`CompletionConfig`] setters. When both provider keys are set, the
//! HuggingFace key wins.

pub mod completions;
pub mod core;
pub mod prompt;
pub mod provider;

pub use completions::{CompletionClient, complete_from_env};
pub use self::core::{
    config::CompletionConfig, error::CompletionError, http::HttpClientConfig, retry::RetryPolicy,
    traits::CompletionProvider,
};
pub use provider::{
    HuggingFaceClient, HuggingFaceConfig, OpenAiClient, OpenAiConfig, Provider,
};
