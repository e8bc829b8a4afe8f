//! The query gateway core.
//!
//! Ties the guard, rewriter, executor and introspection service together
//! behind the four operations both command surfaces dispatch to:
//! - `list_databases`
//! - `list_tables`
//! - `describe_table`
//! - `execute_query` (guard, then rewrite, then data + count queries)

pub mod dispatch;
pub mod guard;
pub mod introspect;
pub mod paginate;

pub use dispatch::Dispatcher;
pub use introspect::IntrospectionService;
pub use paginate::{Paginated, paginate};

use crate::db::ConnectionExecutor;
use crate::error::GatewayResult;
use crate::models::{PagedResult, Pagination, QueryParam};
use serde_json::Value as JsonValue;
use sqlx::MySqlPool;
use tracing::info;

/// The read-only query gateway over a shared connection pool.
#[derive(Debug, Clone)]
pub struct QueryGateway {
    executor: ConnectionExecutor,
    introspection: IntrospectionService,
}

impl QueryGateway {
    /// Create a gateway over the shared pool.
    pub fn new(pool: MySqlPool) -> Self {
        let executor = ConnectionExecutor::new(pool);
        let introspection = IntrospectionService::new(executor.clone());
        Self {
            executor,
            introspection,
        }
    }

    /// The shared statement executor.
    pub fn executor(&self) -> &ConnectionExecutor {
        &self.executor
    }

    /// List all databases on the server.
    pub async fn list_databases(&self) -> GatewayResult<Vec<String>> {
        self.introspection.list_databases().await
    }

    /// List tables of a database (or of the default database).
    pub async fn list_tables(&self, database: Option<&str>) -> GatewayResult<Vec<String>> {
        self.introspection.list_tables(database).await
    }

    /// Describe a table's columns in declaration order.
    pub async fn describe_table(
        &self,
        database: Option<&str>,
        table: &str,
    ) -> GatewayResult<Vec<serde_json::Map<String, JsonValue>>> {
        self.introspection.describe_table(database, table).await
    }

    /// Execute a guarded, paginated SELECT.
    ///
    /// Runs the statement guard, rewrites the statement for the requested
    /// window, then runs the data query and the count query concurrently.
    /// Both are read-only and independent; either failure fails the whole
    /// command. `total` reflects the statement without pagination clauses.
    pub async fn execute_query(
        &self,
        sql: &str,
        params: &[QueryParam],
        limit: u64,
        offset: u64,
    ) -> GatewayResult<PagedResult> {
        guard::classify(sql)?;

        let rewritten = paginate(sql, params, limit, offset)?;

        let (rows, count_rows) = tokio::try_join!(
            self.executor
                .execute(&rewritten.exec_sql, &rewritten.exec_params),
            self.executor
                .execute(&rewritten.count_sql, &rewritten.count_params),
        )?;

        let total = count_rows
            .first()
            .and_then(|row| row.get("total"))
            .and_then(total_as_u64)
            .unwrap_or(0);

        info!(
            rows = rows.len(),
            total = total,
            limit = limit,
            offset = offset,
            "Query executed"
        );

        Ok(PagedResult {
            data: rows,
            pagination: Pagination::new(total, limit, offset),
        })
    }
}

/// COUNT(*) comes back as an integer type but may decode as a number or,
/// for some column modes, a numeric string.
fn total_as_u64(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::Number(n) => n.as_u64().or_else(|| n.as_i64().map(|v| v.max(0) as u64)),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_as_u64_from_number() {
        assert_eq!(total_as_u64(&serde_json::json!(5)), Some(5));
    }

    #[test]
    fn test_total_as_u64_from_string() {
        assert_eq!(total_as_u64(&serde_json::json!("42")), Some(42));
    }

    #[test]
    fn test_total_as_u64_rejects_non_numeric() {
        assert_eq!(total_as_u64(&serde_json::json!(null)), None);
        assert_eq!(total_as_u64(&serde_json::json!("abc")), None);
    }
}
