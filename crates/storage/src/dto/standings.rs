use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{StandingsSnapshot, TeamStanding};

#[derive(Debug, Serialize, ToSchema)]
pub struct StandingsResponse {
    pub captured_at: DateTime<Utc>,
    pub teams: Vec<TeamStanding>,
}

impl From<&StandingsSnapshot> for StandingsResponse {
    fn from(snapshot: &StandingsSnapshot) -> Self {
        Self {
            captured_at: snapshot.captured_at(),
            teams: snapshot.teams().to_vec(),
        }
    }
}
