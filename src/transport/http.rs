//! HTTP transport: REST routes plus the streamable MCP endpoint on one
//! listener.

use crate::auth::AuthConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::mcp::GatewayService;
use crate::rest::{self, AppState};
use crate::transport::{Transport, wait_for_signal};
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// SSE connections may keep the server alive indefinitely, so shutdown is
/// forced after this timeout once a signal arrives.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpTransport {
    state: AppState,
    auth: Arc<AuthConfig>,
    pool: MySqlPool,
    bind_addr: String,
    /// MCP endpoint path nested on the REST router
    endpoint: String,
}

impl HttpTransport {
    pub fn new(
        state: AppState,
        auth: Arc<AuthConfig>,
        pool: MySqlPool,
        bind_addr: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            state,
            auth,
            pool,
            bind_addr: bind_addr.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    async fn run(&self) -> GatewayResult<()> {
        info!("Starting gateway with HTTP transport on {}", self.bind_addr);

        let dispatcher = self.state.dispatcher.clone();
        let mcp_service = StreamableHttpService::new(
            move || Ok(GatewayService::new(dispatcher.clone())),
            LocalSessionManager::default().into(),
            Default::default(),
        );

        // nest_service doesn't support the root path; fall back there.
        let rest_router = rest::router(self.state.clone(), self.auth.clone());
        let app = if self.endpoint == "/" {
            rest_router.fallback_service(mcp_service)
        } else {
            rest_router.nest_service(&self.endpoint, mcp_service)
        };

        let listener = TcpListener::bind(&self.bind_addr).await.map_err(|e| {
            GatewayError::internal(format!("Failed to bind to {}: {}", self.bind_addr, e))
        })?;

        info!(endpoint = %self.endpoint, "MCP endpoint ready");
        self.state
            .events
            .notify(crate::events::EVENT_SERVER_START, "Server started");

        let shutdown_notify = Arc::new(tokio::sync::Notify::new());
        let shutdown_notify_trigger = shutdown_notify.clone();
        let shutdown_signal = async move {
            wait_for_signal().await;
            shutdown_notify_trigger.notify_one();
        };

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

        tokio::select! {
            result = server => {
                match result {
                    Ok(()) => info!("HTTP server stopped"),
                    Err(e) => {
                        error!(error = %e, "HTTP server error");
                        return Err(GatewayError::internal(format!("HTTP server error: {}", e)));
                    }
                }
            }
            _ = async {
                shutdown_notify.notified().await;
                info!(
                    timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
                    "Waiting for connections to close (send signal again to force exit)..."
                );
                tokio::select! {
                    _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => {
                        warn!("Graceful shutdown timeout, forcing exit");
                    }
                    _ = wait_for_signal() => {
                        warn!("Received second signal, forcing immediate exit");
                    }
                }
            } => {}
        }

        info!("Closing connection pool");
        self.pool.close().await;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventHub;
    use crate::gateway::{Dispatcher, QueryGateway};
    use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

    fn test_transport(endpoint: &str) -> HttpTransport {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_lazy_with(MySqlConnectOptions::new().host("localhost"));
        let gateway = Arc::new(QueryGateway::new(pool.clone()));
        let state = AppState {
            dispatcher: Arc::new(Dispatcher::new(gateway)),
            events: EventHub::new(),
            pool: pool.clone(),
        };
        HttpTransport::new(
            state,
            Arc::new(AuthConfig::disabled()),
            pool,
            "127.0.0.1:3000",
            endpoint,
        )
    }

    #[tokio::test]
    async fn test_http_transport_creation() {
        let transport = test_transport("/mcp");
        assert_eq!(transport.name(), "http");
        assert_eq!(transport.bind_addr(), "127.0.0.1:3000");
        assert_eq!(transport.endpoint(), "/mcp");
    }

    #[tokio::test]
    async fn test_http_transport_root_endpoint() {
        let transport = test_transport("/");
        assert_eq!(transport.endpoint(), "/");
    }
}
