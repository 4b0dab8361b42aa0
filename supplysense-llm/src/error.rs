use reqwest::StatusCode;
use supplysense_core::SupplySenseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider rate limited the request: {body}")]
    RateLimited { body: String },
    #[error("provider quota exhausted: {body}")]
    QuotaExhausted { body: String },
    #[error("http error {status}: {body}")]
    Http { status: StatusCode, body: String },
    #[error("tool call '{name}' has invalid arguments: {reason}")]
    InvalidArguments { name: String, reason: String },
    #[error("response contained no choices")]
    EmptyResponse,
}

impl LlmError {
    pub(crate) fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited { body },
            StatusCode::PAYMENT_REQUIRED => LlmError::QuotaExhausted { body },
            _ => LlmError::Http { status, body },
        }
    }
}

impl From<LlmError> for SupplySenseError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::RateLimited { body } => SupplySenseError::RateLimited(body),
            LlmError::QuotaExhausted { body } => SupplySenseError::QuotaExhausted(body),
            LlmError::InvalidArguments { name, reason } => SupplySenseError::ParseFailed {
                output: name,
                reason,
            },
            LlmError::InvalidUrl(err) => SupplySenseError::InvalidConfig(err.to_string()),
            other => SupplySenseError::LlmProvider(other.to_string()),
        }
    }
}
