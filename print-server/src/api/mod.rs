//! API routes
//!
//! - [`health`] - liveness check
//! - [`print`] - image printing

pub mod health;
pub mod print;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;
use crate::utils::json_error_fallback;

/// Build the application router
pub fn router(state: ServerState) -> Router {
    let config = state.config();
    let body_limit = config.max_body_bytes;
    let timeout = config.request_timeout();

    Router::new()
        .merge(health::router())
        .merge(print::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(middleware::map_response(json_error_fallback))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
