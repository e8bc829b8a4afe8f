//! Configuration handling for the query gateway.
//!
//! This module provides configuration management via CLI arguments and
//! environment variables.

use clap::{Parser, ValueEnum};
use std::time::Duration;

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_DB_USER: &str = "root";
pub const DEFAULT_DB_NAME: &str = "mcp_system";
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_MCP_ENDPOINT: &str = "/mcp";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Transport mode for the MCP surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// Streamable HTTP nested on the REST server
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Configuration for the query gateway.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mysql-query-gateway",
    about = "Read-only MySQL query gateway with REST and MCP surfaces",
    version,
    author
)]
pub struct Config {
    /// MySQL server host
    #[arg(long, default_value = DEFAULT_DB_HOST, env = "DB_HOST")]
    pub db_host: String,

    /// MySQL server port
    #[arg(long, default_value_t = DEFAULT_DB_PORT, env = "DB_PORT")]
    pub db_port: u16,

    /// MySQL user
    #[arg(long, default_value = DEFAULT_DB_USER, env = "DB_USER")]
    pub db_user: String,

    /// MySQL password (sensitive - not logged)
    #[arg(long, env = "DB_PASSWORD")]
    pub db_password: Option<String>,

    /// Default database for the connection
    #[arg(long, default_value = DEFAULT_DB_NAME, env = "DB_NAME")]
    pub db_name: String,

    /// Maximum connections in the pool
    #[arg(long, default_value_t = DEFAULT_POOL_SIZE, env = "DB_POOL_SIZE")]
    pub pool_size: u32,

    /// Transport mode for the MCP surface (stdio or http)
    #[arg(short, long, value_enum, default_value = "stdio", env = "MCP_TRANSPORT")]
    pub transport: TransportMode,

    /// HTTP host to bind the REST server to
    #[arg(long, default_value = DEFAULT_HTTP_HOST, env = "HTTP_HOST")]
    pub http_host: String,

    /// HTTP port to bind the REST server to
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT, env = "PORT")]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(long, default_value = DEFAULT_MCP_ENDPOINT, env = "MCP_ENDPOINT")]
    pub mcp_endpoint: String,

    /// Shared secret for the REST surface. When unset, authentication is
    /// disabled and every request is accepted.
    #[arg(long, env = "API_KEY")]
    pub api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self::parse_from(["mysql-query-gateway"])
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Pool acquire timeout as a Duration.
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(crate::db::pool::DEFAULT_ACQUIRE_TIMEOUT_SECS)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.transport, TransportMode::Stdio);
        assert_eq!(config.db_host, DEFAULT_DB_HOST);
        assert_eq!(config.db_port, DEFAULT_DB_PORT);
        assert_eq!(config.db_user, DEFAULT_DB_USER);
        assert_eq!(config.db_name, DEFAULT_DB_NAME);
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert!(config.api_key.is_none());
        assert!(config.db_password.is_none());
    }

    #[test]
    fn test_http_bind_addr() {
        let config = Config::parse_from([
            "mysql-query-gateway",
            "--http-host",
            "127.0.0.1",
            "--http-port",
            "8080",
        ]);
        assert_eq!(config.http_bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_transport_flag() {
        let config = Config::parse_from(["mysql-query-gateway", "--transport", "http"]);
        assert_eq!(config.transport, TransportMode::Http);
    }

    #[test]
    fn test_database_flags() {
        let config = Config::parse_from([
            "mysql-query-gateway",
            "--db-host",
            "db.internal",
            "--db-port",
            "3307",
            "--db-user",
            "reader",
            "--db-password",
            "secret",
            "--db-name",
            "shop",
        ]);
        assert_eq!(config.db_host, "db.internal");
        assert_eq!(config.db_port, 3307);
        assert_eq!(config.db_user, "reader");
        assert_eq!(config.db_password.as_deref(), Some("secret"));
        assert_eq!(config.db_name, "shop");
    }
}
