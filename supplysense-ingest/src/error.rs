use supplysense_core::SupplySenseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("failed to read CSV: {0}")]
    Read(#[from] csv::Error),
    #[error("CSV contains no data rows")]
    Empty,
    #[error("failed to create upload record: {0}")]
    Upload(#[source] SupplySenseError),
    #[error("import stopped after {inserted} of {total} rows: {source}")]
    PartialImport {
        inserted: usize,
        total: usize,
        upload_id: String,
        #[source]
        source: SupplySenseError,
    },
}

impl IngestError {
    /// Messages to show next to the file, one per problem.
    pub fn messages(&self) -> Vec<String> {
        match self {
            IngestError::Validation(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}
