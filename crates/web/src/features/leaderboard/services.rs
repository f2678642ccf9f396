use sqlx::PgPool;
use storage::{
    dto::leaderboard::LeaderboardResponse, error::Result,
    repository::history::HistoryRepository,
};

/// Leaderboard from every participant's newest stored total
pub async fn get_leaderboard(pool: &PgPool) -> Result<LeaderboardResponse> {
    let repo = HistoryRepository::new(pool);
    let rows = repo.latest_totals().await?;

    Ok(LeaderboardResponse::from_latest(rows))
}
