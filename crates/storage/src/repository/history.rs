use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{HistoryPoint, NewHistoryPoint};

/// Serializes history appends across every process sharing the database.
const APPEND_LOCK_KEY: i64 = 0x6c70_6869_7374;

const LATEST_PER_PARTICIPANT: &str = r#"
    SELECT DISTINCT ON (participant_id)
           history_id, participant_id, total_points, recorded_at, run_id
    FROM history_points
    ORDER BY participant_id, recorded_at DESC
"#;

/// A participant's newest stored total, joined with their name.
#[derive(Debug, Clone, FromRow)]
pub struct LatestTotalRow {
    pub participant_id: Uuid,
    pub name: String,
    pub total_points: i64,
    pub recorded_at: DateTime<Utc>,
}

/// Repository for the append-only score history.
pub struct HistoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> HistoryRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn latest_per_participant(&self) -> Result<Vec<HistoryPoint>> {
        let points = sqlx::query_as::<_, HistoryPoint>(LATEST_PER_PARTICIPANT)
            .fetch_all(self.pool)
            .await?;

        Ok(points)
    }

    pub async fn latest_totals(&self) -> Result<Vec<LatestTotalRow>> {
        let rows = sqlx::query_as::<_, LatestTotalRow>(
            r#"
            SELECT DISTINCT ON (h.participant_id)
                   h.participant_id, p.name, h.total_points, h.recorded_at
            FROM history_points h
            INNER JOIN participants p ON p.participant_id = h.participant_id
            ORDER BY h.participant_id, h.recorded_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// A participant's series in chronological order, limited to the newest `limit` points.
    pub async fn list_for_participant(
        &self,
        participant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<HistoryPoint>> {
        let points = sqlx::query_as::<_, HistoryPoint>(
            r#"
            SELECT history_id, participant_id, total_points, recorded_at, run_id
            FROM (
                SELECT history_id, participant_id, total_points, recorded_at, run_id
                FROM history_points
                WHERE participant_id = $1
                ORDER BY recorded_at DESC
                LIMIT $2
            ) newest
            ORDER BY recorded_at ASC
            "#,
        )
        .bind(participant_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(points)
    }

    /// Inserts the whole batch in one transaction, provided the newest point
    /// of every participant still matches `baseline`.
    ///
    /// The transaction holds an advisory lock, so a concurrent reconciliation
    /// in another process waits here and then sees this batch as stale.
    pub async fn append_batch(
        &self,
        batch: &[NewHistoryPoint],
        baseline: &[HistoryPoint],
    ) -> Result<Vec<HistoryPoint>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(APPEND_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let current = sqlx::query_as::<_, HistoryPoint>(LATEST_PER_PARTICIPANT)
            .fetch_all(&mut *tx)
            .await?;
        if !heads_match(&current, baseline) {
            return Err(StorageError::StaleHistory);
        }

        let mut stored = Vec::with_capacity(batch.len());

        for point in batch {
            let inserted = sqlx::query_as::<_, HistoryPoint>(
                r#"
                INSERT INTO history_points (participant_id, total_points, recorded_at, run_id)
                VALUES ($1, $2, $3, $4)
                RETURNING history_id, participant_id, total_points, recorded_at, run_id
                "#,
            )
            .bind(point.participant_id)
            .bind(point.total_points)
            .bind(point.recorded_at)
            .bind(point.run_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(StorageError::from)
            .map_err(|e| {
                if e.is_unique_violation() {
                    StorageError::ConstraintViolation(format!(
                        "participant {} already has a point at {}",
                        point.participant_id, point.recorded_at
                    ))
                } else if e.is_foreign_key_violation() {
                    StorageError::ConstraintViolation(format!(
                        "participant {} does not exist",
                        point.participant_id
                    ))
                } else {
                    e
                }
            })?;

            stored.push(inserted);
        }

        tx.commit().await?;
        Ok(stored)
    }
}

/// True when both sets name the same newest point for every participant.
fn heads_match(current: &[HistoryPoint], baseline: &[HistoryPoint]) -> bool {
    let heads = |points: &[HistoryPoint]| -> HashMap<Uuid, Uuid> {
        points
            .iter()
            .map(|p| (p.participant_id, p.history_id))
            .collect()
    };
    heads(current) == heads(baseline)
}
