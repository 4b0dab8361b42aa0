use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use supplysense_core::SupplySenseError;
use supplysense_ingest::IngestError;
use supplysense_insights::InsightError;
use supplysense_network::NetworkError;
use supplysense_store::StoreError;
use supplysense_voice::VoiceError;

/// An error as returned to HTTP callers: a status and an `{ error }` body,
/// plus the individual messages for CSV validation failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    errors: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    errors: &'a [String],
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn from_code(code: u16, message: String) -> Self {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), error = %self.message, "request failed");
        }
        let body = ErrorBody {
            error: &self.message,
            errors: &self.errors,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<InsightError> for ApiError {
    fn from(err: InsightError) -> Self {
        Self::from_code(err.status_code(), err.to_string())
    }
}

impl From<NetworkError> for ApiError {
    fn from(err: NetworkError) -> Self {
        Self::from_code(err.status_code(), err.to_string())
    }
}

impl From<VoiceError> for ApiError {
    fn from(err: VoiceError) -> Self {
        Self::from_code(err.status_code(), err.to_string())
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Validation(errors) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: "CSV validation failed".to_string(),
                errors,
            },
            IngestError::Read(_) | IngestError::Empty => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: "CSV validation failed".to_string(),
                errors: err.messages(),
            },
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<SupplySenseError> for ApiError {
    fn from(err: SupplySenseError) -> Self {
        match err {
            SupplySenseError::InvalidRequest(message) => Self::bad_request(message),
            SupplySenseError::NotFound(message) => Self::not_found(message),
            other => Self::from_code(other.provider_status().unwrap_or(500), other.to_string()),
        }
    }
}
