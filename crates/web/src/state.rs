use std::sync::Arc;

use axum::extract::FromRef;
use storage::Database;
use storage::services::ReconciliationService;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub reconciler: Arc<ReconciliationService>,
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Arc<ReconciliationService> {
    fn from_ref(state: &AppState) -> Self {
        state.reconciler.clone()
    }
}
