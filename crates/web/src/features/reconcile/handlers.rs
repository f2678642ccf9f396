use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use storage::{
    dto::reconcile::{ReconcileQuery, ReconcileStateResponse},
    services::{ReconcileReport, ReconciliationService},
};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    post,
    path = "/api/admin/reconcile",
    params(ReconcileQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Reconciliation outcome", body = ReconcileReport),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "A reconciliation is already running, here or in another process"),
        (status = 422, description = "Standings or predictions violate table invariants"),
        (status = 500, description = "History could not be persisted"),
        (status = 502, description = "Standings provider unavailable"),
        (status = 503, description = "Predictions or history could not be read")
    ),
    tag = "admin"
)]
pub async fn trigger_reconcile(
    State(reconciler): State<Arc<ReconciliationService>>,
    Query(query): Query<ReconcileQuery>,
) -> Result<Response, WebError> {
    let report = services::trigger(&reconciler, query.dry_run).await?;

    Ok(Json(report).into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/reconcile/state",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current reconciliation state", body = ReconcileStateResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin"
)]
pub async fn get_reconcile_state(
    State(reconciler): State<Arc<ReconciliationService>>,
) -> Result<Response, WebError> {
    Ok(Json(ReconcileStateResponse {
        state: reconciler.state(),
    })
    .into_response())
}
