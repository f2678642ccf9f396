use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::{dto::standings::StandingsResponse, services::ReconciliationService};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/standings",
    responses(
        (status = 200, description = "Live league table", body = StandingsResponse),
        (status = 422, description = "Provider returned an inconsistent table"),
        (status = 502, description = "Standings provider unavailable")
    ),
    tag = "standings"
)]
pub async fn get_standings(
    State(reconciler): State<Arc<ReconciliationService>>,
) -> Result<Response, WebError> {
    let standings = services::get_standings(&reconciler).await?;

    Ok(Json(standings).into_response())
}
