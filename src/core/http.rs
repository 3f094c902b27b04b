//! Shared HTTP plumbing for the provider clients.

use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use super::error::CompletionError;

/// Configuration for the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
        }
    }
}

/// Thin wrapper around `reqwest::Client` shared by both provider clients.
///
/// Does not retry and does not judge status codes; each provider has its own
/// status policy (HuggingFace treats 503 specially), and retries are composed
/// on top by [`crate::core::retry::retry`].
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &HttpClientConfig, user_agent: Option<&str>) -> Result<Self, CompletionError> {
        let default_ua = format!("formulai/{}", env!("CARGO_PKG_VERSION"));
        let ua = user_agent.unwrap_or(&default_ua);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(ua)
            .build()
            .map_err(|e| {
                CompletionError::Configuration(format!("Failed to build reqwest client: {e}"))
            })?;

        Ok(Self { client })
    }

    /// POST a JSON body, returning the raw status and body text.
    pub async fn post_json<Req>(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Req,
    ) -> Result<JsonResponse, CompletionError>
    where
        Req: Serialize,
    {
        let mut req_builder = self.client.post(url).json(body);
        for (name, value) in headers {
            req_builder = req_builder.header(name, value);
        }

        let res = req_builder
            .send()
            .await
            .map_err(|e| CompletionError::Network {
                message: format!("Request to {url} failed"),
                source: e,
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| CompletionError::Network {
            message: "Failed to read response body".to_string(),
            source: e,
        })?;

        Ok(JsonResponse { status, body })
    }
}

/// A completed HTTP exchange, body not yet decoded.
#[derive(Debug)]
pub struct JsonResponse {
    pub status: reqwest::StatusCode,
    pub body: String,
}

impl JsonResponse {
    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, CompletionError> {
        serde_json::from_str(&self.body).map_err(|e| CompletionError::Parse {
            message: "Failed to parse API response".to_string(),
            source: Some(Box::new(e)),
        })
    }
}
