//! HTTP tracker routes: `/announce` and `/scrape`, layered with the same
//! compression/request-id/trace/timeout stack the UDP frontend's caller
//! applies at the transport level.
use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::{HeaderName, StatusCode};
use axum::routing::get;
use axum::{BoxError, Router};
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::propagate_header::PropagateHeaderLayer;
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use super::handlers;
use super::server::AppState;

#[must_use]
pub fn router(state: Arc<AppState>, read_timeout_ms: u64) -> Router {
    Router::new()
        .route("/announce", get(handlers::announce))
        .route("/scrape", get(handlers::scrape))
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateHeaderLayer::new(HeaderName::from_static("x-request-id")))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO)))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|_: BoxError| async { StatusCode::REQUEST_TIMEOUT }))
                .layer(TimeoutLayer::new(Duration::from_millis(read_timeout_ms))),
        )
}
