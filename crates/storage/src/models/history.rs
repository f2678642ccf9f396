use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One persisted total in a participant's score series.
///
/// History points are append-only: the engine never updates or deletes
/// them. Every point appended by the same reconciliation run shares its
/// `run_id` and `recorded_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct HistoryPoint {
    pub history_id: Uuid,
    pub participant_id: Uuid,
    pub total_points: i64,
    pub recorded_at: DateTime<Utc>,
    pub run_id: Uuid,
}

/// A history point that has been computed but not yet written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NewHistoryPoint {
    pub participant_id: Uuid,
    pub total_points: i64,
    pub recorded_at: DateTime<Utc>,
    pub run_id: Uuid,
}
