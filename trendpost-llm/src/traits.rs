use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trendpost_common::{Result, TrendpostError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid API key")]
    InvalidKey,

    #[error("API access forbidden")]
    Forbidden,

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Content blocked by safety filters")]
    Blocked,

    #[error("Empty response: {0}")]
    Empty(String),
}

impl From<LlmError> for TrendpostError {
    fn from(err: LlmError) -> Self {
        TrendpostError::Generation(err.to_string())
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to a single user prompt.
    async fn generate(&self, prompt: &str) -> Result<LlmResponse>;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}
