use storage::models::RawStanding;

use super::models::{StandingsResponse, TableRow};
use super::spec::TeamNaming;
use crate::error::{ImporterError, Result};

const TOTAL_TABLE: &str = "TOTAL";

/// Turns a football-data.org standings payload into provider-neutral rows.
pub struct FootballDataTransformer {
    naming: TeamNaming,
}

impl FootballDataTransformer {
    pub fn new(naming: TeamNaming) -> Self {
        Self { naming }
    }

    /// Picks the overall table; home and away tables are ignored.
    pub fn transform(&self, response: StandingsResponse) -> Result<Vec<RawStanding>> {
        let table = response
            .standings
            .into_iter()
            .find(|t| t.table_type.eq_ignore_ascii_case(TOTAL_TABLE))
            .ok_or_else(|| {
                ImporterError::TransformationError(format!(
                    "no {} table in standings for {}",
                    TOTAL_TABLE, response.competition.code
                ))
            })?;

        if table.table.is_empty() {
            return Err(ImporterError::TransformationError(format!(
                "{} table for {} has no rows",
                TOTAL_TABLE, response.competition.code
            )));
        }

        table
            .table
            .into_iter()
            .map(|row| self.transform_row(row))
            .collect()
    }

    fn transform_row(&self, row: TableRow) -> Result<RawStanding> {
        let team = match self.naming {
            TeamNaming::Full => row.team.name,
            TeamNaming::Short => row.team.short_name.unwrap_or(row.team.name),
        };

        if team.trim().is_empty() {
            return Err(ImporterError::TransformationError(format!(
                "team {} has no name",
                row.team.id
            )));
        }

        Ok(RawStanding {
            team,
            position: row.position,
            played: row.played_games,
            won: row.won,
            drawn: row.draw,
            lost: row.lost,
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            goal_difference: row.goal_difference,
            points: row.points,
        })
    }
}
