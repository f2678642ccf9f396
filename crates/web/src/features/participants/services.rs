use sqlx::PgPool;
use storage::{
    dto::history::{HistoryPointResponse, HistorySeriesResponse},
    error::Result,
    models::{Participant, Prediction},
    repository::{
        history::HistoryRepository, participant::ParticipantRepository,
        prediction::PredictionRepository,
    },
};
use uuid::Uuid;

pub async fn list_participants(pool: &PgPool) -> Result<Vec<Participant>> {
    let repo = ParticipantRepository::new(pool);
    repo.list().await
}

/// Score series of one participant, oldest first
pub async fn get_history(
    pool: &PgPool,
    participant_id: Uuid,
    limit: i64,
) -> Result<HistorySeriesResponse> {
    let participant = ParticipantRepository::new(pool)
        .find_by_id(participant_id)
        .await?;

    let points = HistoryRepository::new(pool)
        .list_for_participant(participant_id, limit)
        .await?;

    Ok(HistorySeriesResponse {
        participant_id: participant.participant_id,
        participant_name: participant.name,
        points: points.into_iter().map(HistoryPointResponse::from).collect(),
    })
}

pub async fn get_prediction(pool: &PgPool, participant_id: Uuid) -> Result<Prediction> {
    let repo = PredictionRepository::new(pool);
    repo.find_for_participant(participant_id).await
}
