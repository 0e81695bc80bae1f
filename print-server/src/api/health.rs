//! Health check
//!
//! | Path | Method | Response |
//! |------|--------|----------|
//! | /health | GET | `ok` |

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

pub async fn health() -> &'static str {
    "ok"
}
