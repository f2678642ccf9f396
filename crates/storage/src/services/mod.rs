pub mod leaderboard;
pub mod position_scoring;
pub mod prediction_scoring;
pub mod reconciliation;

pub use leaderboard::{LeaderboardEntry, ParticipantTotal, build_leaderboard};
pub use prediction_scoring::{ParticipantScore, PredictionScoreLine, ScoreWarning, score_participant};
pub use reconciliation::{
    Clock, ReconcileReport, ReconcileState, ReconcileStatus, ReconciliationService, SystemClock,
};
