use supplysense_core::SupplySenseError;
use supplysense_store::StoreError;
use thiserror::Error;

/// Failures of an analysis run. `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("No sales data found. Please upload data first.")]
    NoSalesData,
    #[error("No upload found")]
    NoUpload,
    #[error("Rate limit exceeded. Please try again in a moment.")]
    RateLimited,
    #[error("AI credits exhausted. Please add credits in Settings.")]
    QuotaExhausted,
    #[error("AI analysis failed")]
    Provider(#[source] SupplySenseError),
    #[error("AI did not return expected tool call")]
    MissingToolCall,
    #[error("AI returned malformed analysis: {0}")]
    InvalidToolOutput(#[source] serde_json::Error),
    #[error("{0}")]
    Storage(#[from] StoreError),
}

impl InsightError {
    pub fn status_code(&self) -> u16 {
        match self {
            InsightError::RateLimited => 429,
            InsightError::QuotaExhausted => 402,
            _ => 500,
        }
    }
}

impl From<SupplySenseError> for InsightError {
    fn from(err: SupplySenseError) -> Self {
        match err {
            SupplySenseError::RateLimited(_) => InsightError::RateLimited,
            SupplySenseError::QuotaExhausted(_) => InsightError::QuotaExhausted,
            other => InsightError::Provider(other),
        }
    }
}
