use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{TeamKey, permutation};
use crate::error::InvariantViolation;

/// One team row as delivered by a standings provider, before normalization.
///
/// `position` is optional because some providers only return the table
/// content; in that case the snapshot derives positions from points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RawStanding {
    pub team: String,
    pub position: Option<u32>,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
}

/// A team's place in a normalized snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeamStanding {
    pub team: String,
    pub position: u32,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
}

impl TeamStanding {
    fn from_raw(raw: RawStanding, position: u32) -> Self {
        Self {
            team: raw.team,
            position,
            played: raw.played,
            won: raw.won,
            drawn: raw.drawn,
            lost: raw.lost,
            goals_for: raw.goals_for,
            goals_against: raw.goals_against,
            goal_difference: raw.goal_difference,
            points: raw.points,
        }
    }
}

/// Immutable point-in-time league table, ordered by position.
///
/// Built fresh from every provider fetch and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct StandingsSnapshot {
    captured_at: DateTime<Utc>,
    teams: Vec<TeamStanding>,
    index: HashMap<TeamKey, usize>,
}

impl StandingsSnapshot {
    /// Normalizes a provider response into a canonical table.
    ///
    /// When every row carries a position, the provider order is ground truth
    /// and must be a permutation of `1..=N`. When no row does, teams are
    /// ranked by points, goal difference, goals scored, then name. A mix of
    /// both is rejected.
    pub fn build(
        raw: Vec<RawStanding>,
        captured_at: DateTime<Utc>,
    ) -> Result<Self, InvariantViolation> {
        if raw.is_empty() {
            return Err(InvariantViolation::EmptySnapshot);
        }

        let size = raw.len();
        let with_position = raw.iter().filter(|r| r.position.is_some()).count();

        let teams: Vec<TeamStanding> = if with_position == size {
            let positions = raw.iter().filter_map(|r| r.position);
            if let Some(detail) = permutation::find_defect(positions, size) {
                return Err(InvariantViolation::SnapshotPositions { size, detail });
            }

            let mut teams: Vec<TeamStanding> = raw
                .into_iter()
                .filter_map(|r| r.position.map(|p| TeamStanding::from_raw(r, p)))
                .collect();
            teams.sort_by_key(|t| t.position);
            teams
        } else if with_position == 0 {
            let mut raw = raw;
            raw.sort_by(|a, b| {
                (Reverse(a.points), Reverse(a.goal_difference), Reverse(a.goals_for))
                    .cmp(&(Reverse(b.points), Reverse(b.goal_difference), Reverse(b.goals_for)))
                    .then_with(|| TeamKey::new(&a.team).cmp(&TeamKey::new(&b.team)))
            });
            raw.into_iter()
                .zip(1u32..)
                .map(|(r, position)| TeamStanding::from_raw(r, position))
                .collect()
        } else {
            return Err(InvariantViolation::SnapshotPositions {
                size,
                detail: format!("{} of {size} rows carry no position", size - with_position),
            });
        };

        let mut index = HashMap::with_capacity(teams.len());
        for (idx, team) in teams.iter().enumerate() {
            if index.insert(TeamKey::new(&team.team), idx).is_some() {
                return Err(InvariantViolation::DuplicateSnapshotTeam(team.team.clone()));
            }
        }

        Ok(Self {
            captured_at,
            teams,
            index,
        })
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn teams(&self) -> &[TeamStanding] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn find(&self, team: &str) -> Option<&TeamStanding> {
        self.index
            .get(&TeamKey::new(team))
            .and_then(|&idx| self.teams.get(idx))
    }

    pub fn position_of(&self, team: &str) -> Option<u32> {
        self.find(team).map(|t| t.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(team: &str, position: Option<u32>, points: u32, goal_difference: i32) -> RawStanding {
        RawStanding {
            team: team.to_string(),
            position,
            played: 10,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 10,
            goals_against: 0,
            goal_difference,
            points,
        }
    }

    #[test]
    fn test_provider_positions_are_ground_truth() {
        let snapshot = StandingsSnapshot::build(
            vec![
                raw("Chelsea", Some(2), 30, 5),
                raw("Arsenal", Some(1), 20, 1),
                raw("Fulham", Some(3), 40, 9),
            ],
            Utc::now(),
        )
        .unwrap();

        let order: Vec<&str> = snapshot.teams().iter().map(|t| t.team.as_str()).collect();
        assert_eq!(order, vec!["Arsenal", "Chelsea", "Fulham"]);
    }

    #[test]
    fn test_points_order_when_positions_absent() {
        let snapshot = StandingsSnapshot::build(
            vec![
                raw("Fulham", None, 20, 1),
                raw("Arsenal", None, 30, 2),
                raw("Chelsea", None, 20, 4),
            ],
            Utc::now(),
        )
        .unwrap();

        assert_eq!(snapshot.position_of("Arsenal"), Some(1));
        assert_eq!(snapshot.position_of("Chelsea"), Some(2));
        assert_eq!(snapshot.position_of("Fulham"), Some(3));
    }

    #[test]
    fn test_points_order_breaks_full_ties_by_name() {
        let snapshot = StandingsSnapshot::build(
            vec![raw("Wolves", None, 10, 0), raw("Brentford", None, 10, 0)],
            Utc::now(),
        )
        .unwrap();

        assert_eq!(snapshot.position_of("Brentford"), Some(1));
    }

    #[test]
    fn test_duplicate_positions_rejected() {
        let result = StandingsSnapshot::build(
            vec![raw("Arsenal", Some(1), 0, 0), raw("Chelsea", Some(1), 0, 0)],
            Utc::now(),
        );
        assert!(matches!(
            result,
            Err(InvariantViolation::SnapshotPositions { size: 2, .. })
        ));
    }

    #[test]
    fn test_mixed_positions_rejected() {
        let result = StandingsSnapshot::build(
            vec![raw("Arsenal", Some(1), 0, 0), raw("Chelsea", None, 0, 0)],
            Utc::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_team_rejected() {
        let result = StandingsSnapshot::build(
            vec![raw("Arsenal", Some(1), 0, 0), raw("Arsenal FC", Some(2), 0, 0)],
            Utc::now(),
        );
        assert_eq!(
            result.unwrap_err(),
            InvariantViolation::DuplicateSnapshotTeam("Arsenal FC".to_string())
        );
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            StandingsSnapshot::build(vec![], Utc::now()).unwrap_err(),
            InvariantViolation::EmptySnapshot
        );
    }

    #[test]
    fn test_lookup_uses_team_key() {
        let snapshot =
            StandingsSnapshot::build(vec![raw("Arsenal FC", Some(1), 0, 0)], Utc::now()).unwrap();
        assert_eq!(snapshot.position_of("arsenal"), Some(1));
        assert!(snapshot.find("Chelsea").is_none());
    }
}
