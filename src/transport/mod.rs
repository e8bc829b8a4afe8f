//! Transport layer for the gateway.
//!
//! Two ways to run the process:
//! - Stdio: the MCP surface speaks JSON-RPC on stdin/stdout while the
//!   REST server listens in the background
//! - HTTP: one axum server carries the REST routes with the streamable
//!   MCP service nested at the configured endpoint

pub mod http;
pub mod stdio;

pub use http::HttpTransport;
pub use stdio::StdioTransport;

use crate::error::GatewayResult;
use std::future::Future;
use tokio::signal;
use tracing::info;

/// Trait for gateway transport implementations.
pub trait Transport: Send + Sync {
    /// Start the transport and block until shutdown.
    fn run(&self) -> impl Future<Output = GatewayResult<()>> + Send;

    /// Name of this transport for logging.
    fn name(&self) -> &'static str;
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
pub(crate) async fn wait_for_signal() {
    let ctrl_c = async {
        // Installing the handler can only fail without a reactor.
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
