use supplysense_core::SupplySenseError;
use supplysense_store::StoreError;
use thiserror::Error;

/// Failures of a coordination run. `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Rate limited. Try again shortly.")]
    RateLimited,
    #[error("AI coordination failed")]
    Provider(#[source] SupplySenseError),
    #[error("AI did not return coordination result")]
    MissingToolCall,
    #[error("AI returned a malformed coordination result: {0}")]
    InvalidToolOutput(#[source] serde_json::Error),
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),
    #[error("invalid agent roster: {0}")]
    InvalidRoster(String),
    #[error("failed to read agent roster {path}: {source}")]
    RosterRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Storage(#[from] StoreError),
}

impl NetworkError {
    pub fn status_code(&self) -> u16 {
        match self {
            NetworkError::RateLimited => 429,
            NetworkError::UnknownScenario(_) => 404,
            _ => 500,
        }
    }
}

impl From<SupplySenseError> for NetworkError {
    fn from(err: SupplySenseError) -> Self {
        match err {
            SupplySenseError::RateLimited(_) => NetworkError::RateLimited,
            other => NetworkError::Provider(other),
        }
    }
}
