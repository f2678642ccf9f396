use storage::{
    error::ReconcileError,
    services::{ReconcileReport, ReconciliationService},
};

pub async fn trigger(
    reconciler: &ReconciliationService,
    dry_run: bool,
) -> Result<ReconcileReport, ReconcileError> {
    if dry_run {
        reconciler.preview().await
    } else {
        reconciler.reconcile().await
    }
}
