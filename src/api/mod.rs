//! HTTP boundary for the matching engine
//!
//! A single `/trading` route carries the whole surface: GET with a `type`
//! selector for the read views, POST with a tagged action body for
//! mutations. Engine errors map to 400/404 JSON responses.

pub mod error;
pub mod handlers;
pub mod models;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::engine::Matcher;
use crate::metrics::EngineMetrics;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Matcher>,
    pub metrics: Arc<EngineMetrics>,
}

impl AppState {
    pub fn new(engine: Arc<Matcher>, metrics: Arc<EngineMetrics>) -> Self {
        Self { engine, metrics }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/trading",
            get(handlers::get_trading).post(handlers::post_trading),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
