//! HTTP generation backend
//!
//! Talks to a text-generation server that accepts token ids and returns the
//! extended sequence.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::invoker::{GenerationError, GenerationParams, Generator};
use crate::config::GeneratorConfig;
use crate::context::TokenId;

/// Generator backed by a remote generation endpoint
pub struct HttpGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
}

impl HttpGenerator {
    /// Create a new HTTP generator
    pub fn new(config: &GeneratorConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GenerationError::InitializationError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone().map(SecretString::new),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(
        &self,
        input: &[TokenId],
        params: &GenerationParams,
    ) -> Result<Vec<TokenId>, GenerationError> {
        debug!(
            "Requesting generation from {} with {} input tokens",
            self.endpoint,
            input.len()
        );

        let request = GenerateRequest {
            model: &self.model,
            input_ids: input,
            parameters: params,
        };

        let mut req = self.client.post(&self.endpoint).json(&request);

        if let Some(ref api_key) = self.api_key {
            req = req.bearer_auth(api_key.expose_secret());
        }

        let response = req
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api(format!("HTTP {}: {}", status, body)));
        }

        let body = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| GenerationError::Decode(format!("Failed to parse response: {}", e)))?;

        debug!("Generation returned {} tokens", body.output_ids.len());
        Ok(body.output_ids)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    input_ids: &'a [TokenId],
    parameters: &'a GenerationParams,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    output_ids: Vec<TokenId>,
}
