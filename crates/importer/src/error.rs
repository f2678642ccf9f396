use storage::error::ProviderError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImporterError>;

#[derive(Error, Debug)]
pub enum ImporterError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::error::StorageError),

    #[error("Data transformation error: {0}")]
    TransformationError(String),

    #[error("Import error: {0}")]
    ImportError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ImporterError> for ProviderError {
    fn from(error: ImporterError) -> Self {
        match error {
            ImporterError::ParseError(_) | ImporterError::TransformationError(_) => {
                ProviderError::Malformed(error.to_string())
            }
            other => ProviderError::Unreachable(other.to_string()),
        }
    }
}
