//! Generation invoker contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GenerationConfig;
use crate::context::TokenId;

/// Decoding parameters sent with every generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Ceiling on the total output length (input + continuation)
    pub max_length: usize,
    pub pad_token_id: TokenId,
    pub temperature: f32,
    pub repetition_penalty: f32,
}

impl GenerationParams {
    pub fn from_config(config: &GenerationConfig, pad_token_id: TokenId) -> Self {
        Self {
            max_length: config.max_length,
            pad_token_id,
            temperature: config.temperature,
            repetition_penalty: config.repetition_penalty,
        }
    }
}

/// Extends a token sequence with newly generated tokens.
///
/// The returned sequence is expected to start with `input` unchanged and to
/// carry the continuation after it. Callers do not verify the prefix.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        input: &[TokenId],
        params: &GenerationParams,
    ) -> Result<Vec<TokenId>, GenerationError>;
}

/// Generation errors
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Initialization error: {0}")]
    InitializationError(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Malformed output: {output_len} tokens returned for an input of {input_len}")]
    MalformedOutput { input_len: usize, output_len: usize },
}
