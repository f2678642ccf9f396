use serde::{Deserialize, Serialize};

pub const FORMAT_VERSION: &str = "1.0.0";

/// Pre-season predictions of every participant, as handed in before kick-off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionsFile {
    pub format_version: String,
    pub season: String,
    pub competition: String,
    pub participants: Vec<ParticipantEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantEntry {
    pub name: String,
    /// Teams top to bottom: `ranking[0]` is predicted champion.
    pub ranking: Vec<String>,
}

impl PredictionsFile {
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}
