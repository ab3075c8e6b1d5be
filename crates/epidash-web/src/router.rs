//! Axum router: maps all URL paths to handlers.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    ask::ask, chat::chat, data::data, groups::diseases_groups, method_not_allowed,
};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/api/data",            get(data).fallback(method_not_allowed))
        .route("/api/chat",            post(chat).fallback(method_not_allowed))
        .route("/api/ask",             post(ask).fallback(method_not_allowed))
        .route("/api/diseases-groups", get(diseases_groups).fallback(method_not_allowed))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
