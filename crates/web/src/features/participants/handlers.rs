use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::history::{HistoryQuery, HistorySeriesResponse},
    models::{Participant, Prediction},
    services::{ParticipantScore, ReconciliationService},
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/participants",
    responses(
        (status = 200, description = "All participants", body = Vec<Participant>)
    ),
    tag = "participants"
)]
pub async fn list_participants(State(db): State<Database>) -> Result<Response, WebError> {
    let participants = services::list_participants(db.pool()).await?;

    Ok(Json(participants).into_response())
}

#[utoipa::path(
    get,
    path = "/api/participants/{id}/history",
    params(
        ("id" = Uuid, Path, description = "Participant id"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "Score history, oldest first", body = HistorySeriesResponse),
        (status = 400, description = "Invalid limit"),
        (status = 404, description = "Participant not found")
    ),
    tag = "participants"
)]
pub async fn get_history(
    State(db): State<Database>,
    Path(participant_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, WebError> {
    query.validate()?;

    let series = services::get_history(db.pool(), participant_id, query.limit).await?;

    Ok(Json(series).into_response())
}

#[utoipa::path(
    get,
    path = "/api/participants/{id}/prediction",
    params(
        ("id" = Uuid, Path, description = "Participant id")
    ),
    responses(
        (status = 200, description = "Pre-season ranking of the participant", body = Prediction),
        (status = 404, description = "Participant not found")
    ),
    tag = "participants"
)]
pub async fn get_prediction(
    State(db): State<Database>,
    Path(participant_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let prediction = services::get_prediction(db.pool(), participant_id).await?;

    Ok(Json(prediction).into_response())
}

#[utoipa::path(
    get,
    path = "/api/participants/{id}/scores",
    params(
        ("id" = Uuid, Path, description = "Participant id")
    ),
    responses(
        (status = 200, description = "Per-team breakdown against the live table", body = ParticipantScore),
        (status = 404, description = "Participant not found"),
        (status = 422, description = "Standings or prediction violate table invariants"),
        (status = 502, description = "Standings provider unavailable"),
        (status = 503, description = "Predictions could not be read")
    ),
    tag = "participants"
)]
pub async fn get_scores(
    State(reconciler): State<Arc<ReconciliationService>>,
    Path(participant_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let score = reconciler.score_participant(participant_id).await?;

    Ok(Json(score).into_response())
}
