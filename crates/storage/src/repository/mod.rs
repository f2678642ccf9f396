pub mod history;
pub mod participant;
pub mod prediction;

use async_trait::async_trait;

use crate::Database;
use crate::error::Result;
use crate::models::{HistoryPoint, NewHistoryPoint, Prediction};
use crate::traits::{HistoryStore, PredictionStore};
use history::HistoryRepository;
use prediction::PredictionRepository;

#[async_trait]
impl PredictionStore for Database {
    async fn load_predictions(&self) -> Result<Vec<Prediction>> {
        PredictionRepository::new(self.pool()).load_all().await
    }
}

#[async_trait]
impl HistoryStore for Database {
    async fn latest_points(&self) -> Result<Vec<HistoryPoint>> {
        HistoryRepository::new(self.pool()).latest_per_participant().await
    }

    async fn append_points(
        &self,
        batch: &[NewHistoryPoint],
        baseline: &[HistoryPoint],
    ) -> Result<Vec<HistoryPoint>> {
        HistoryRepository::new(self.pool())
            .append_batch(batch, baseline)
            .await
    }
}
