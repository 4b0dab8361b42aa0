use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupplySenseError {
    #[error("LLM provider rate limited the request: {0}")]
    RateLimited(String),
    #[error("LLM provider quota exhausted: {0}")]
    QuotaExhausted(String),
    #[error("LLM provider failed: {0}")]
    LlmProvider(String),
    #[error("Parsing failed on output '{output}': {reason}")]
    ParseFailed { output: String, reason: String },
    #[error("Storage failed: {0}")]
    Storage(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}

impl SupplySenseError {
    /// HTTP status the provider answered with, when the failure came from one.
    pub fn provider_status(&self) -> Option<u16> {
        match self {
            SupplySenseError::RateLimited(_) => Some(429),
            SupplySenseError::QuotaExhausted(_) => Some(402),
            _ => None,
        }
    }
}
