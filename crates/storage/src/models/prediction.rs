use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{TeamKey, permutation};
use crate::error::InvariantViolation;

/// One team placed at one position in a participant's pre-season ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PredictedPosition {
    pub team: String,
    pub position: u32,
}

/// A participant's full pre-season ranking of the league.
///
/// Predictions are written once before the season and only ever read
/// afterwards. Positions must form a permutation of `1..=N`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Prediction {
    pub participant_id: Uuid,
    pub participant_name: String,
    pub entries: Vec<PredictedPosition>,
}

impl Prediction {
    pub fn new(
        participant_id: Uuid,
        participant_name: impl Into<String>,
        entries: Vec<PredictedPosition>,
    ) -> Self {
        Self {
            participant_id,
            participant_name: participant_name.into(),
            entries,
        }
    }

    /// Builds a prediction from teams listed top to bottom.
    pub fn from_ranking<I, S>(participant_id: Uuid, participant_name: impl Into<String>, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = teams
            .into_iter()
            .zip(1u32..)
            .map(|(team, position)| PredictedPosition {
                team: team.into(),
                position,
            })
            .collect();

        Self::new(participant_id, participant_name, entries)
    }

    pub fn team_count(&self) -> usize {
        self.entries.len()
    }

    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if self.entries.is_empty() {
            return Err(InvariantViolation::EmptyPrediction {
                participant: self.participant_name.clone(),
            });
        }

        let size = self.entries.len();
        if let Some(detail) = permutation::find_defect(self.entries.iter().map(|e| e.position), size)
        {
            return Err(InvariantViolation::PredictionPositions {
                participant: self.participant_name.clone(),
                size,
                detail,
            });
        }

        let mut teams = HashSet::with_capacity(size);
        for entry in &self.entries {
            if !teams.insert(TeamKey::new(&entry.team)) {
                return Err(InvariantViolation::DuplicatePredictedTeam {
                    participant: self.participant_name.clone(),
                    team: entry.team.clone(),
                });
            }
        }

        Ok(())
    }

    /// Groups flat database rows into one prediction per participant,
    /// preserving the order in which participants first appear.
    pub fn group_rows(rows: Vec<PredictionRow>) -> Vec<Prediction> {
        let mut predictions: Vec<Prediction> = Vec::new();

        for row in rows {
            let entry = PredictedPosition {
                team: row.team_name,
                position: u32::try_from(row.position).unwrap_or(0),
            };

            match predictions.last_mut() {
                Some(current) if current.participant_id == row.participant_id => {
                    current.entries.push(entry);
                }
                _ => predictions.push(Prediction::new(
                    row.participant_id,
                    row.participant_name,
                    vec![entry],
                )),
            }
        }

        predictions
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PredictionRow {
    pub participant_id: Uuid,
    pub participant_name: String,
    pub team_name: String,
    pub position: i32,
}
