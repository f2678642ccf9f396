use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::services::ReconcileState;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReconcileQuery {
    /// Score and decide without writing history
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReconcileStateResponse {
    pub state: ReconcileState,
}
