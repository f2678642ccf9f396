pub mod canonical;
pub mod error;
pub mod sources;

pub use error::{ImporterError, Result};

pub use sources::football_data::{
    CompetitionCode, FootballDataClient, FootballDataImporter, FootballDataSpec, TeamNaming,
};
