use std::collections::{BTreeSet, HashMap, HashSet};

use storage::models::{Prediction, TeamKey};
use tracing::warn;
use uuid::Uuid;

use super::models::{FORMAT_VERSION, PredictionsFile};
use crate::{ImporterError, Result};

pub struct PredictionsValidator;

impl PredictionsValidator {
    pub fn validate(file: &PredictionsFile) -> Result<ValidationReport> {
        let mut report = ValidationReport::default();

        if file.format_version != FORMAT_VERSION {
            report.errors.push(format!(
                "Unsupported format version: {}. Expected {}",
                file.format_version, FORMAT_VERSION
            ));
        }

        if file.season.trim().is_empty() {
            report.errors.push("Season is required".to_string());
        }
        if file.competition.trim().is_empty() {
            report.errors.push("Competition is required".to_string());
        }

        if file.participants.is_empty() {
            report
                .errors
                .push("At least one participant is required".to_string());
        }

        let mut names = HashSet::new();
        let mut expected_len: Option<usize> = None;
        let mut team_mentions: HashMap<TeamKey, (String, usize)> = HashMap::new();

        for (idx, participant) in file.participants.iter().enumerate() {
            let label = if participant.name.trim().is_empty() {
                format!("#{}", idx + 1)
            } else {
                participant.name.clone()
            };

            if participant.name.trim().is_empty() {
                report
                    .errors
                    .push(format!("Participant {} has an empty name", label));
            } else if !names.insert(participant.name.trim().to_lowercase()) {
                report
                    .errors
                    .push(format!("Duplicate participant: '{}'", participant.name));
            }

            match expected_len {
                None => expected_len = Some(participant.ranking.len()),
                Some(len) if len != participant.ranking.len() => {
                    report.errors.push(format!(
                        "Participant '{}' ranks {} teams, expected {}",
                        label,
                        participant.ranking.len(),
                        len
                    ));
                }
                Some(_) => {}
            }

            for team in &participant.ranking {
                if team.trim().is_empty() {
                    report
                        .errors
                        .push(format!("Participant '{}' has an empty team name", label));
                }
            }

            let prediction =
                Prediction::from_ranking(Uuid::nil(), label.clone(), participant.ranking.iter().cloned());
            if let Err(e) = prediction.validate() {
                report.errors.push(e.to_string());
            }

            let mut seen = HashSet::new();
            for team in &participant.ranking {
                let key = TeamKey::new(team);
                if seen.insert(key.clone()) {
                    team_mentions
                        .entry(key)
                        .or_insert_with(|| (team.clone(), 0))
                        .1 += 1;
                }
            }
        }

        let participants = file.participants.len();
        let partial: BTreeSet<&str> = team_mentions
            .values()
            .filter(|(_, count)| *count < participants)
            .map(|(team, _)| team.as_str())
            .collect();
        for team in partial {
            report.warnings.push(format!(
                "Team '{}' is not ranked by every participant",
                team
            ));
        }

        if !report.errors.is_empty() {
            Err(ImporterError::ValidationError(format!(
                "Validation failed with {} error(s): {}",
                report.errors.len(),
                report.errors.join("; ")
            )))
        } else {
            Ok(report)
        }
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}
