use storage::{
    dto::standings::StandingsResponse, error::ReconcileError,
    services::ReconciliationService,
};

pub async fn get_standings(
    reconciler: &ReconciliationService,
) -> Result<StandingsResponse, ReconcileError> {
    let snapshot = reconciler.current_snapshot().await?;

    Ok(StandingsResponse::from(&snapshot))
}
