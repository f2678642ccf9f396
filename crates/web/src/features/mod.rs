pub mod leaderboard;
pub mod participants;
pub mod reconcile;
pub mod standings;
