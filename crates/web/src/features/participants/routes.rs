use axum::{Router, routing::get};

use super::handlers::{get_history, get_prediction, get_scores, list_participants};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_participants))
        .route("/:id/history", get(get_history))
        .route("/:id/prediction", get(get_prediction))
        .route("/:id/scores", get(get_scores))
}
