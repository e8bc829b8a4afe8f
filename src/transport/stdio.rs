//! Stdio transport: MCP over stdin/stdout with the REST server alongside.

use crate::auth::AuthConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::mcp::GatewayService;
use crate::rest::{self, AppState};
use crate::transport::{Transport, wait_for_signal};
use rmcp::{ServiceExt, transport::stdio};
use sqlx::MySqlPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub struct StdioTransport {
    state: AppState,
    auth: Arc<AuthConfig>,
    pool: MySqlPool,
    bind_addr: String,
}

impl StdioTransport {
    pub fn new(
        state: AppState,
        auth: Arc<AuthConfig>,
        pool: MySqlPool,
        bind_addr: impl Into<String>,
    ) -> Self {
        Self {
            state,
            auth,
            pool,
            bind_addr: bind_addr.into(),
        }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> GatewayResult<()> {
        info!("Starting gateway with stdio transport");

        // REST stays available while MCP runs on stdio.
        let rest_router = rest::router(self.state.clone(), self.auth.clone());
        let listener = TcpListener::bind(&self.bind_addr).await.map_err(|e| {
            GatewayError::internal(format!("Failed to bind to {}: {}", self.bind_addr, e))
        })?;
        info!(addr = %self.bind_addr, "REST server listening");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, rest_router).await {
                warn!(error = %e, "REST server error");
            }
        });

        self.state
            .events
            .notify(crate::events::EVENT_SERVER_START, "Server started");

        let service = GatewayService::new(self.state.dispatcher.clone());
        let running_service = service.serve(stdio()).await.map_err(|e| {
            GatewayError::internal(format!("Failed to start stdio transport: {}", e))
        })?;

        let shutdown_requested = tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(_quit_reason) => info!("Stdio transport completed normally"),
                    Err(e) => {
                        warn!(error = %e, "Stdio transport error");
                        return Err(GatewayError::internal(format!(
                            "Stdio transport error: {}",
                            e
                        )));
                    }
                }
                false
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                true
            }
        };

        if shutdown_requested {
            tokio::spawn(async {
                wait_for_signal().await;
                warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });
        }

        info!("Closing connection pool");
        self.pool.close().await;

        if shutdown_requested {
            // tokio::select! cannot interrupt blocking stdin reads, so the
            // process must exit explicitly.
            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventHub;
    use crate::gateway::{Dispatcher, QueryGateway};
    use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

    #[tokio::test]
    async fn test_stdio_transport_creation() {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_lazy_with(MySqlConnectOptions::new().host("localhost"));
        let gateway = Arc::new(QueryGateway::new(pool.clone()));
        let state = AppState {
            dispatcher: Arc::new(Dispatcher::new(gateway)),
            events: EventHub::new(),
            pool: pool.clone(),
        };
        let transport = StdioTransport::new(
            state,
            Arc::new(AuthConfig::disabled()),
            pool,
            "127.0.0.1:3000",
        );
        assert_eq!(transport.name(), "stdio");
    }
}
