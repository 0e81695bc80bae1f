//! Server Implementation
//!
//! HTTP server startup and shutdown

use crate::api;
use crate::core::{Config, ServerState};
use tokio::net::TcpListener;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let state = match self.state {
            Some(s) => s,
            None => ServerState::initialize(&self.config),
        };

        let addr = format!("{}:{}", self.config.http_host, self.config.http_port);
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Print server listening on http://{}", addr);

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        axum::serve(listener, api::router(state))
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
