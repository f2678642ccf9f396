pub mod history;
pub mod participant;
mod permutation;
pub mod prediction;
pub mod standings;
pub mod team_key;

pub use history::{HistoryPoint, NewHistoryPoint};
pub use participant::Participant;
pub use prediction::{PredictedPosition, Prediction, PredictionRow};
pub use standings::{RawStanding, StandingsSnapshot, TeamStanding};
pub use team_key::TeamKey;
