use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Participant;

/// Repository for Participant database operations
pub struct ParticipantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ParticipantRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all participants by name
    pub async fn list(&self) -> Result<Vec<Participant>> {
        let participants = sqlx::query_as::<_, Participant>(
            r#"
            SELECT participant_id, name, created_at
            FROM participants
            ORDER BY LOWER(name), participant_id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(participants)
    }

    pub async fn find_by_id(&self, participant_id: Uuid) -> Result<Participant> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            SELECT participant_id, name, created_at
            FROM participants
            WHERE participant_id = $1
            "#,
        )
        .bind(participant_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(participant)
    }
}
