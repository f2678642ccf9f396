use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::repository::history::LatestTotalRow;
use crate::services::leaderboard::{LeaderboardEntry, ParticipantTotal, build_leaderboard};

/// Leaderboard derived from each participant's newest history point
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub as_of: Option<DateTime<Utc>>,
    pub entries: Vec<LeaderboardEntry>,
}

impl LeaderboardResponse {
    pub fn from_latest(rows: Vec<LatestTotalRow>) -> Self {
        let as_of = rows.iter().map(|r| r.recorded_at).max();

        let totals: Vec<ParticipantTotal> = rows
            .into_iter()
            .map(|row| ParticipantTotal {
                participant_id: row.participant_id,
                participant_name: row.name,
                total: u32::try_from(row.total_points).unwrap_or(0),
                as_of: row.recorded_at,
            })
            .collect();

        Self {
            as_of,
            entries: build_leaderboard(&totals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use uuid::Uuid;

    fn row(name: &str, total_points: i64, recorded_at: DateTime<Utc>) -> LatestTotalRow {
        LatestTotalRow {
            participant_id: Uuid::new_v4(),
            name: name.to_string(),
            total_points,
            recorded_at,
        }
    }

    #[test]
    fn test_from_latest_ranks_and_dates() {
        let earlier = Utc::now();
        let later = earlier + TimeDelta::minutes(5);

        let response = LeaderboardResponse::from_latest(vec![
            row("Carol", 40, earlier),
            row("Alice", 50, later),
            row("Bob", 50, later),
        ]);

        assert_eq!(response.as_of, Some(later));
        let ranks: Vec<(u32, &str)> = response
            .entries
            .iter()
            .map(|e| (e.rank, e.participant_name.as_str()))
            .collect();
        assert_eq!(ranks, vec![(1, "Alice"), (1, "Bob"), (3, "Carol")]);
    }

    #[test]
    fn test_empty_history() {
        let response = LeaderboardResponse::from_latest(vec![]);
        assert!(response.as_of.is_none());
        assert!(response.entries.is_empty());
    }
}
