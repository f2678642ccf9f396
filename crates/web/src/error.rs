use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use storage::error::{ReconcileError, StorageError};
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Reconcile(ReconcileError),
    Validation(ValidationErrors),
    Unauthorized,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Reconcile(e) => write!(f, "Reconciliation error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::Unauthorized => write!(f, "Unauthorized"),
        }
    }
}

impl WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::ConstraintViolation(_)) => StatusCode::CONFLICT,
            Self::Storage(StorageError::StaleHistory) => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Reconcile(ReconcileError::InputInvariantViolation(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Reconcile(ReconcileError::UpstreamUnavailable(_)) => StatusCode::BAD_GATEWAY,
            Self::Reconcile(ReconcileError::StoreUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Reconcile(ReconcileError::PersistenceFailure(StorageError::StaleHistory)) => {
                StatusCode::CONFLICT
            }
            Self::Reconcile(ReconcileError::PersistenceFailure(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Reconcile(ReconcileError::AlreadyRunning) => StatusCode::CONFLICT,
            Self::Reconcile(ReconcileError::UnknownParticipant(_)) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match &self {
            Self::Storage(StorageError::NotFound) => {
                json!({
                    "error": "Resource not found"
                })
            }
            Self::Storage(StorageError::ConstraintViolation(msg)) => {
                json!({
                    "error": msg
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Reconcile(ReconcileError::StoreUnavailable(e)) => {
                tracing::error!("Stored inputs unreadable during reconciliation: {:?}", e);
                json!({
                    "error": "Predictions or score history could not be read; retry later",
                    "retryable": true
                })
            }
            Self::Reconcile(ReconcileError::PersistenceFailure(StorageError::StaleHistory)) => {
                json!({
                    "error": "Score history is being updated by another run; retry later",
                    "retryable": true
                })
            }
            Self::Reconcile(ReconcileError::PersistenceFailure(e)) => {
                tracing::error!("Persistence failure during reconciliation: {:?}", e);
                json!({
                    "error": "Scores could not be stored; retry later",
                    "retryable": true
                })
            }
            Self::Reconcile(e) => {
                json!({
                    "error": e.to_string(),
                    "retryable": e.is_retryable()
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
            Self::Unauthorized => {
                json!({
                    "error": "Unauthorized"
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ReconcileError> for WebError {
    fn from(error: ReconcileError) -> Self {
        Self::Reconcile(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}
