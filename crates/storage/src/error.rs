use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("History changed since it was read")]
    StaleHistory,
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }
}

/// Failure reported by a standings provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("standings provider unreachable: {0}")]
    Unreachable(String),

    #[error("malformed standings response: {0}")]
    Malformed(String),
}

/// Structural problems with predictions or snapshots. Any of these aborts a
/// reconciliation run before a single line is scored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("standings snapshot contains no teams")]
    EmptySnapshot,

    #[error("standings snapshot positions are not a permutation of 1..={size}: {detail}")]
    SnapshotPositions { size: usize, detail: String },

    #[error("team '{0}' appears more than once in the standings snapshot")]
    DuplicateSnapshotTeam(String),

    #[error("prediction of '{participant}' is empty")]
    EmptyPrediction { participant: String },

    #[error("prediction of '{participant}' is not a permutation of 1..={size}: {detail}")]
    PredictionPositions {
        participant: String,
        size: usize,
        detail: String,
    },

    #[error("prediction of '{participant}' ranks '{team}' more than once")]
    DuplicatePredictedTeam { participant: String, team: String },
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("input invariant violated: {0}")]
    InputInvariantViolation(#[from] InvariantViolation),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] ProviderError),

    #[error("stored predictions or history could not be read: {0}")]
    StoreUnavailable(StorageError),

    #[error("persistence failure: {0}")]
    PersistenceFailure(StorageError),

    #[error("a reconciliation run is already in flight")]
    AlreadyRunning,

    #[error("participant {0} has no stored prediction")]
    UnknownParticipant(Uuid),
}

impl ReconcileError {
    /// Whether the scheduler may simply trigger again later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReconcileError::UpstreamUnavailable(_)
                | ReconcileError::StoreUnavailable(_)
                | ReconcileError::PersistenceFailure(_)
                | ReconcileError::AlreadyRunning
        )
    }
}
