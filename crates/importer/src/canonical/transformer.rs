use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::models::{ParticipantEntry, PredictionsFile};
use crate::{ImporterError, Result};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub participants: usize,
    pub predictions: usize,
}

/// Loads a validated predictions file into the database.
///
/// Predictions are immutable once the season starts, so a participant that
/// already exists aborts the whole import instead of being overwritten.
pub struct PredictionsTransformer<'a> {
    pool: &'a PgPool,
}

impl<'a> PredictionsTransformer<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn import_to_database(&self, file: PredictionsFile) -> Result<ImportSummary> {
        let mut tx = self.pool.begin().await?;
        let mut summary = ImportSummary::default();

        for participant in &file.participants {
            self.ensure_new_participant(&participant.name, &mut tx)
                .await?;

            let participant_id = self.insert_participant(participant, &mut tx).await?;
            summary.predictions += self
                .insert_prediction(participant_id, participant, &mut tx)
                .await?;
            summary.participants += 1;

            info!(
                "Imported prediction of '{}' ({} teams)",
                participant.name,
                participant.ranking.len()
            );
        }

        tx.commit().await?;
        Ok(summary)
    }

    async fn ensure_new_participant(
        &self,
        name: &str,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<()> {
        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT participant_id FROM participants WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name.trim())
        .fetch_optional(&mut **tx)
        .await?;

        match existing {
            Some(id) => Err(ImporterError::ImportError(format!(
                "Participant '{}' already exists ({}); predictions cannot be replaced",
                name, id
            ))),
            None => Ok(()),
        }
    }

    async fn insert_participant(
        &self,
        participant: &ParticipantEntry,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<Uuid> {
        let participant_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO participants (name)
            VALUES ($1)
            RETURNING participant_id
            "#,
        )
        .bind(participant.name.trim())
        .fetch_one(&mut **tx)
        .await?;

        Ok(participant_id)
    }

    async fn insert_prediction(
        &self,
        participant_id: Uuid,
        participant: &ParticipantEntry,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<usize> {
        for (idx, team) in participant.ranking.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO predictions (participant_id, team_name, position)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(participant_id)
            .bind(team.trim())
            .bind(idx as i32 + 1)
            .execute(&mut **tx)
            .await?;
        }

        Ok(participant.ranking.len())
    }
}
