//! Connection pool construction.
//!
//! The gateway holds a single bounded MySQL pool for its whole lifetime.
//! Acquisition queues when all connections are busy; the pool capacity is
//! the only backpressure mechanism, with a 30 second acquire timeout so a
//! saturated pool surfaces as an execution error instead of hanging the
//! caller forever.

use crate::config::Config;
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use std::time::Duration;
use tracing::debug;

/// Default acquire timeout for pool checkout.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Build the shared connection pool from configuration.
///
/// The pool connects lazily: the first statement establishes the first
/// connection, so startup succeeds even when the database is briefly
/// unreachable. Use [`test_connection`] to probe connectivity.
pub fn build_pool(config: &Config) -> MySqlPool {
    let options = MySqlConnectOptions::new()
        .host(&config.db_host)
        .port(config.db_port)
        .username(&config.db_user)
        .password(config.db_password.as_deref().unwrap_or(""))
        .database(&config.db_name);

    debug!(
        host = %config.db_host,
        port = config.db_port,
        database = %config.db_name,
        pool_size = config.pool_size,
        "Building connection pool"
    );

    MySqlPoolOptions::new()
        .max_connections(config.pool_size)
        .acquire_timeout(Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS))
        .connect_lazy_with(options)
}

/// Probe database connectivity with a trivial round-trip.
///
/// Callers decide how loudly to report the outcome; the status route
/// probes on every request.
pub async fn test_connection(pool: &MySqlPool) -> bool {
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => true,
        Err(e) => {
            debug!(error = %e, "Connectivity probe failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn test_build_pool_is_lazy() {
        // connect_lazy never touches the network, so building a pool
        // against a bogus host must succeed.
        let config = Config::parse_from([
            "gateway",
            "--db-host",
            "nonexistent.invalid",
            "--db-password",
            "secret",
        ]);
        let pool = build_pool(&config);
        assert_eq!(pool.size(), 0);
    }
}
