// src/server/mod.rs
// =============================================================================
// HTTP adapter: the axum router and the shared application state handed to
// every request handler.
// =============================================================================

mod handlers;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::checker::Checker;
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub checker: Arc<Checker>,
    pub storage: Arc<Storage>,
    /// Flipped once, false -> true, when shutdown begins. Requests seeing
    /// true take the deferred path instead of probing.
    pub shutting_down: Arc<AtomicBool>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/check", post(handlers::check_links))
        .route("/report", post(handlers::get_report))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
