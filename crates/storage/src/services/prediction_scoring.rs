use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::leaderboard::ParticipantTotal;
use super::position_scoring;
use crate::models::{Prediction, StandingsSnapshot};

/// Score for one predicted team against one snapshot.
///
/// `actual_position` and `points` are both `None` when the team could not
/// be found in the snapshot; such lines do not count towards the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PredictionScoreLine {
    pub participant_id: Uuid,
    pub team: String,
    pub predicted_position: u32,
    pub actual_position: Option<u32>,
    pub points: Option<u32>,
}

impl PredictionScoreLine {
    pub fn is_scored(&self) -> bool {
        self.points.is_some()
    }
}

/// Non-fatal findings attached to a scoring result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreWarning {
    UnresolvedTeam { participant: String, team: String },
}

impl fmt::Display for ScoreWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedTeam { participant, team } => write!(
                f,
                "team '{}' predicted by '{}' is not in the current standings",
                team, participant
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ParticipantScore {
    pub participant_id: Uuid,
    pub participant_name: String,
    pub lines: Vec<PredictionScoreLine>,
    pub total: u32,
    pub as_of: DateTime<Utc>,
    pub warnings: Vec<ScoreWarning>,
}

impl ParticipantScore {
    /// True when at least one predicted team went unscored.
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn to_total(&self) -> ParticipantTotal {
        ParticipantTotal {
            participant_id: self.participant_id,
            participant_name: self.participant_name.clone(),
            total: self.total,
            as_of: self.as_of,
        }
    }
}

/// Scores every team of one participant's prediction against a snapshot.
///
/// The prediction must already have passed [`Prediction::validate`]. Lines
/// come back ordered by predicted position.
pub fn score_participant(prediction: &Prediction, snapshot: &StandingsSnapshot) -> ParticipantScore {
    // A lagging provider may list fewer (or more) teams than were predicted.
    let table_size = prediction.team_count().max(snapshot.len()) as u32;

    let mut entries: Vec<_> = prediction.entries.iter().collect();
    entries.sort_by_key(|e| e.position);

    let mut warnings = Vec::new();
    let lines: Vec<PredictionScoreLine> = entries
        .into_iter()
        .map(|entry| {
            let actual_position = snapshot.position_of(&entry.team);
            if actual_position.is_none() {
                warnings.push(ScoreWarning::UnresolvedTeam {
                    participant: prediction.participant_name.clone(),
                    team: entry.team.clone(),
                });
            }

            PredictionScoreLine {
                participant_id: prediction.participant_id,
                team: entry.team.clone(),
                predicted_position: entry.position,
                actual_position,
                points: actual_position
                    .map(|actual| position_scoring::score(entry.position, actual, table_size)),
            }
        })
        .collect();

    let total = lines.iter().filter_map(|line| line.points).sum::<u32>();

    ParticipantScore {
        participant_id: prediction.participant_id,
        participant_name: prediction.participant_name.clone(),
        lines,
        total,
        as_of: snapshot.captured_at(),
        warnings,
    }
}
