use serde::{Deserialize, Serialize};

/// Response of `GET /v4/competitions/{code}/standings`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StandingsResponse {
    pub competition: CompetitionInfo,
    pub season: Option<SeasonInfo>,
    pub standings: Vec<StandingsTable>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CompetitionInfo {
    pub id: i64,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SeasonInfo {
    pub id: i64,
    pub start_date: String,
    pub end_date: String,
    pub current_matchday: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StandingsTable {
    pub stage: Option<String>,
    #[serde(rename = "type")]
    pub table_type: String,
    pub group: Option<String>,
    pub table: Vec<TableRow>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub position: Option<u32>,
    pub team: Team,
    pub played_games: u32,
    pub won: u32,
    pub draw: u32,
    pub lost: u32,
    pub points: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub short_name: Option<String>,
    pub tla: Option<String>,
}
