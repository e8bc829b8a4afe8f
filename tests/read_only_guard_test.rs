//! Integration tests for the read-only statement guard.
//!
//! These tests verify that write statements are rejected with the fixed
//! forbidden message before any database work happens, on both the public
//! guard API and the full command path.

use mysql_query_gateway::error::{FORBIDDEN_STATEMENT_MESSAGE, GatewayError};
use mysql_query_gateway::gateway::dispatch::CMD_EXECUTE_QUERY;
use mysql_query_gateway::gateway::{Dispatcher, QueryGateway, guard};
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use std::sync::Arc;

/// Dispatcher over an unreachable lazy pool: guard rejections must surface
/// without a connection attempt.
fn setup_dispatcher() -> Dispatcher {
    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .connect_lazy_with(MySqlConnectOptions::new().host("127.0.0.1").port(9));
    Dispatcher::new(Arc::new(QueryGateway::new(pool)))
}

#[test]
fn test_guard_rejects_each_banned_operation() {
    let statements = [
        "DROP TABLE users",
        "TRUNCATE TABLE users",
        "DELETE FROM users WHERE id = 1",
        "UPDATE users SET name = 'x'",
        "INSERT INTO users (id) VALUES (1)",
    ];
    for sql in statements {
        let err = guard::classify(sql).unwrap_err();
        assert!(
            matches!(err, GatewayError::ForbiddenStatement),
            "expected rejection for: {}",
            sql
        );
        assert_eq!(err.to_string(), FORBIDDEN_STATEMENT_MESSAGE);
    }
}

#[test]
fn test_guard_rejects_mixed_case_and_embedded_writes() {
    assert!(guard::classify("dRoP table users").is_err());
    assert!(guard::classify("SELECT 1; DELETE FROM users").is_err());
    // Substring policy: a SELECT merely mentioning a banned word in a
    // literal is also rejected.
    assert!(guard::classify("SELECT * FROM log WHERE op = 'delete'").is_err());
}

#[test]
fn test_guard_permits_read_statements() {
    assert!(guard::classify("SELECT id, name FROM users WHERE id = ?").is_ok());
    assert!(guard::classify("SHOW DATABASES").is_ok());
    assert!(guard::classify("DESCRIBE users").is_ok());
    assert!(guard::classify("EXPLAIN SELECT * FROM users").is_ok());
}

#[test]
fn test_guard_rejects_ddl_without_banned_substring() {
    // The substring list misses these; the parser layer must not.
    assert!(guard::classify("CREATE TABLE x (id INT)").is_err());
    assert!(guard::classify("ALTER TABLE users RENAME TO people").is_err());
    assert!(guard::classify("GRANT SELECT ON *.* TO 'eve'@'%'").is_err());
}

#[tokio::test]
async fn test_execute_query_command_rejects_write_before_db_access() {
    let dispatcher = setup_dispatcher();
    let err = dispatcher
        .invoke(
            CMD_EXECUTE_QUERY,
            serde_json::json!({ "sql": "DELETE FROM users" }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::ForbiddenStatement));
    assert_eq!(err.status_code().as_u16(), 403);
}

#[tokio::test]
async fn test_forbidden_maps_to_mcp_invalid_params() {
    let dispatcher = setup_dispatcher();
    let err = dispatcher
        .invoke(
            CMD_EXECUTE_QUERY,
            serde_json::json!({ "sql": "TRUNCATE TABLE users" }),
        )
        .await
        .unwrap_err();
    let mcp_err: rmcp::ErrorData = err.into();
    assert_eq!(mcp_err.code.0, -32602);
    assert!(mcp_err.message.contains(FORBIDDEN_STATEMENT_MESSAGE));
}
