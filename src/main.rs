//! MySQL Query Gateway - Main entry point.
//!
//! Serves read-only MySQL access over two surfaces: a REST API and MCP
//! (Model Context Protocol) tools for AI assistants.

use clap::Parser;
use mysql_query_gateway::auth::AuthConfig;
use mysql_query_gateway::config::{Config, TransportMode};
use mysql_query_gateway::db::{build_pool, test_connection};
use mysql_query_gateway::events::EventHub;
use mysql_query_gateway::gateway::{Dispatcher, QueryGateway};
use mysql_query_gateway::rest::AppState;
use mysql_query_gateway::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    init_tracing(&config);

    info!(
        transport = %config.transport,
        "Starting MySQL Query Gateway v{}",
        env!("CARGO_PKG_VERSION")
    );

    if config.api_key.is_none() {
        warn!("No API key configured; the REST surface accepts unauthenticated requests");
    }

    let pool = build_pool(&config);
    if test_connection(&pool).await {
        info!(
            host = %config.db_host,
            port = config.db_port,
            database = %config.db_name,
            "Database connection verified"
        );
    } else {
        // The pool is lazy; commands will keep retrying, so startup
        // proceeds with a warning rather than failing hard.
        warn!(
            host = %config.db_host,
            port = config.db_port,
            "Could not reach the database at startup"
        );
    }

    let events = EventHub::new();
    let gateway = Arc::new(QueryGateway::new(pool.clone()));
    let dispatcher = Arc::new(Dispatcher::new(gateway).with_events(events.clone()));
    let state = AppState {
        dispatcher,
        events,
        pool: pool.clone(),
    };
    let auth = Arc::new(AuthConfig::from_key(config.api_key.clone()));

    let result = match config.transport {
        TransportMode::Stdio => {
            info!("Using stdio transport");
            let transport = StdioTransport::new(state, auth, pool, config.http_bind_addr());
            transport.run().await
        }
        TransportMode::Http => {
            info!(
                addr = %config.http_bind_addr(),
                endpoint = %config.mcp_endpoint,
                "Using HTTP transport"
            );
            let transport = HttpTransport::new(
                state,
                auth,
                pool,
                config.http_bind_addr(),
                &config.mcp_endpoint,
            );
            transport.run().await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
