use std::sync::Arc;

use axum::Router;
use jdb_store::DocumentStore;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router serving `store`.
pub fn build_router(store: Arc<DocumentStore>) -> Router {
    Router::new()
        .fallback(handler::dispatch)
        .with_state(AppState { store })
        .layer(TraceLayer::new_for_http())
}
