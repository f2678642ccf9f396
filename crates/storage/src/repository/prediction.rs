use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Prediction, PredictionRow};

pub struct PredictionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PredictionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every participant's prediction, participants ordered by name and
    /// entries by position.
    pub async fn load_all(&self) -> Result<Vec<Prediction>> {
        let rows = sqlx::query_as::<_, PredictionRow>(
            r#"
            SELECT p.participant_id, p.name AS participant_name, pr.team_name, pr.position
            FROM predictions pr
            INNER JOIN participants p ON p.participant_id = pr.participant_id
            ORDER BY LOWER(p.name), p.participant_id, pr.position
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(Prediction::group_rows(rows))
    }

    pub async fn find_for_participant(&self, participant_id: Uuid) -> Result<Prediction> {
        let rows = sqlx::query_as::<_, PredictionRow>(
            r#"
            SELECT p.participant_id, p.name AS participant_name, pr.team_name, pr.position
            FROM predictions pr
            INNER JOIN participants p ON p.participant_id = pr.participant_id
            WHERE p.participant_id = $1
            ORDER BY pr.position
            "#,
        )
        .bind(participant_id)
        .fetch_all(self.pool)
        .await?;

        Prediction::group_rows(rows)
            .into_iter()
            .next()
            .ok_or(StorageError::NotFound)
    }
}
