//! HTTP gateway: routing and request handling over the enrichment pipeline,
//! cache, and image-verification boundary.

mod error;
mod handler;
mod payload;
mod state;

#[cfg(test)]
mod handler_tests;

pub use error::GatewayError;
pub use state::HandlerState;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::aggregator::SourceAggregator;
use crate::cache::RecordStore;

/// Builds the full application router over the given state.
pub fn router<A, R>(state: HandlerState<A, R>) -> Router
where
    A: SourceAggregator + 'static,
    R: RecordStore + 'static,
{
    Router::new()
        .route("/health", get(handler::health))
        .route("/healthz", get(handler::health))
        .route("/api/enrich", post(handler::enrich))
        .route(
            "/api/cache",
            get(handler::list_cache).delete(handler::clear_cache),
        )
        .route("/verify-image", post(handler::verify_image))
        .route("/compare-images", post(handler::compare_images))
        .route("/extract-attributes", post(handler::extract_attributes))
        .route("/preload", post(handler::preload))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
