pub mod store;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::Health;

use crate::observability;
use crate::state::ServerState;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (axum::http::StatusCode, String) {
    observability::encode_metrics()
}

/// Build the full application router: store routes, history, health and metrics.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let store_routes = Router::new()
        .route("/store/set", post(store::set))
        .route("/store/get", get(store::get))
        .route("/store/delete", post(store::delete))
        .route("/store/cart", get(store::cart))
        .route("/store/commit", post(store::commit))
        .route("/store/rollback", post(store::rollback))
        .route("/history", get(store::history));

    let ops = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    store_routes
        .merge(ops)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
