use async_trait::async_trait;

use crate::error::{ProviderError, Result};
use crate::models::{HistoryPoint, NewHistoryPoint, Prediction, RawStanding};

/// Source of live league standings.
#[async_trait]
pub trait StandingsProvider: Send + Sync {
    async fn fetch_standings(&self) -> std::result::Result<Vec<RawStanding>, ProviderError>;

    fn name(&self) -> &'static str;
}

/// Read-only access to every participant's pre-season prediction.
#[async_trait]
pub trait PredictionStore: Send + Sync {
    async fn load_predictions(&self) -> Result<Vec<Prediction>>;
}

/// Append-only score history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Most recent point of every participant that has one.
    async fn latest_points(&self) -> Result<Vec<HistoryPoint>>;

    /// Stores the whole batch atomically: either every point is committed or none is.
    ///
    /// `baseline` is the result of the [`latest_points`](Self::latest_points)
    /// call the batch was decided on. When any other writer appended since,
    /// nothing is stored and [`StaleHistory`](crate::error::StorageError::StaleHistory) is returned.
    async fn append_points(
        &self,
        batch: &[NewHistoryPoint],
        baseline: &[HistoryPoint],
    ) -> Result<Vec<HistoryPoint>>;
}
