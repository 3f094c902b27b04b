use thiserror::Error;

use crate::provider::Provider;

/// Errors produced while requesting or assembling a completion.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// A client could not be constructed from the given configuration.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The request never reached the provider, or the response body could
    /// not be read.
    #[error("{message}")]
    Network {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-200 status.
    #[error("{provider} API returned status {status}")]
    Api {
        provider: Provider,
        status: u16,
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("{message}")]
    Parse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The named column does not exist in the table schema.
    #[error("No column {col_id} in table {table_id}")]
    UnknownColumn { table_id: String, col_id: String },

    /// No provider is configured, or every attempt against the configured
    /// provider failed. The last attempt error is kept as the source.
    #[error("Please set OPENAI_API_KEY or HUGGINGFACE_API_KEY (and optionally COMPLETION_MODEL)")]
    NoCompletion {
        #[source]
        source: Option<Box<CompletionError>>,
    },
}
