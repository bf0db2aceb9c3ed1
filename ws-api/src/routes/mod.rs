pub mod health;
pub mod targets;
pub mod workspaces;

use crate::state::AppState;
use axum::Router;
use serde::Deserialize;
use tokio_util::sync::{CancellationToken, DropGuard};
use tower_http::trace::TraceLayer;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(workspaces::routes())
        .merge(targets::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct VerboseQuery {
    #[serde(default)]
    pub verbose: bool,
}

/// Token tied to the lifetime of a request handler. Axum drops the handler
/// future when the client goes away, which cancels any pending enrichment.
pub(crate) fn request_token() -> (CancellationToken, DropGuard) {
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    (token, guard)
}
