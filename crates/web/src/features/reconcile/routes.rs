use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{get_reconcile_state, trigger_reconcile};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    Router::new()
        .route("/reconcile", post(trigger_reconcile))
        .route("/reconcile/state", get(get_reconcile_state))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
