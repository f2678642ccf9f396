use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A participant's total against one snapshot (or one stored history point).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParticipantTotal {
    pub participant_id: Uuid,
    pub participant_name: String,
    pub total: u32,
    pub as_of: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub participant_id: Uuid,
    pub participant_name: String,
    pub total: u32,
}

/// Ranks participants by total, highest first.
///
/// Equal totals share a rank and the next rank skips accordingly
/// (1, 2, 2, 4). Rows with equal totals are listed by participant name,
/// case-insensitive, then by participant id, so the output never depends
/// on input order.
pub fn build_leaderboard(totals: &[ParticipantTotal]) -> Vec<LeaderboardEntry> {
    let mut sorted: Vec<&ParticipantTotal> = totals.iter().collect();
    sorted.sort_by_cached_key(|t| {
        (
            Reverse(t.total),
            t.participant_name.to_lowercase(),
            t.participant_id,
        )
    });

    let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(sorted.len());
    for (idx, total) in sorted.into_iter().enumerate() {
        let rank = match entries.last() {
            Some(prev) if prev.total == total.total => prev.rank,
            _ => idx as u32 + 1,
        };

        entries.push(LeaderboardEntry {
            rank,
            participant_id: total.participant_id,
            participant_name: total.participant_name.clone(),
            total: total.total,
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(name: &str, points: u32) -> ParticipantTotal {
        ParticipantTotal {
            participant_id: Uuid::new_v4(),
            participant_name: name.to_string(),
            total: points,
            as_of: Utc::now(),
        }
    }

    fn ranks(entries: &[LeaderboardEntry]) -> Vec<u32> {
        entries.iter().map(|e| e.rank).collect()
    }

    #[test]
    fn test_equal_totals_share_rank() {
        let board = build_leaderboard(&[total("A", 50), total("B", 50), total("C", 40)]);
        assert_eq!(ranks(&board), vec![1, 1, 3]);
    }

    #[test]
    fn test_competition_ranking_skips() {
        let board = build_leaderboard(&[
            total("A", 10),
            total("B", 30),
            total("C", 20),
            total("D", 20),
            total("E", 5),
        ]);
        assert_eq!(ranks(&board), vec![1, 2, 2, 4, 5]);
        assert_eq!(board[0].participant_name, "B");
    }

    #[test]
    fn test_ties_listed_alphabetically_regardless_of_input_order() {
        let forward = build_leaderboard(&[total("bob", 50), total("Alice", 50), total("carol", 50)]);
        let names: Vec<&str> = forward.iter().map(|e| e.participant_name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "bob", "carol"]);
        assert_eq!(ranks(&forward), vec![1, 1, 1]);
    }

    #[test]
    fn test_input_order_irrelevant() {
        let input = vec![total("A", 12), total("B", 40), total("C", 12), total("D", 3)];
        let mut reversed = input.clone();
        reversed.reverse();
        assert_eq!(build_leaderboard(&input), build_leaderboard(&reversed));
    }

    #[test]
    fn test_empty() {
        assert!(build_leaderboard(&[]).is_empty());
    }
}
