pub mod history;
pub mod leaderboard;
pub mod reconcile;
pub mod standings;
