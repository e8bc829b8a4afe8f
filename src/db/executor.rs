//! Statement execution against the shared pool.
//!
//! The executor owns the only path from gateway code to the database:
//! acquire a connection from the pool, run one parameterized statement,
//! decode the rows to JSON, release the connection. Connections are
//! released automatically when the sqlx future completes, on success and
//! error paths alike. Failures surface as `GatewayError::Execution`; the
//! executor never retries.

use crate::db::types::row_to_json_map;
use crate::error::GatewayResult;
use crate::models::QueryParam;
use serde_json::Value as JsonValue;
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use tracing::debug;

/// Executor for read statements on the shared MySQL pool.
#[derive(Debug, Clone)]
pub struct ConnectionExecutor {
    pool: MySqlPool,
}

impl ConnectionExecutor {
    /// Create an executor over an existing pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// The underlying pool handle.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Execute a parameterized statement and return all rows as JSON maps.
    ///
    /// The parameter count must match the number of `?` placeholders left
    /// in `sql`; the driver reports a mismatch as an execution error.
    pub async fn execute(
        &self,
        sql: &str,
        params: &[QueryParam],
    ) -> GatewayResult<Vec<serde_json::Map<String, JsonValue>>> {
        debug!(sql = %sql, params = params.len(), "Executing statement");

        // Statements without parameters run unprepared: SHOW and DESCRIBE
        // are not accepted by every MySQL version as prepared statements.
        let rows: Vec<MySqlRow> = if params.is_empty() {
            use sqlx::Executor;
            self.pool.fetch_all(sql).await?
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            query.fetch_all(&self.pool).await?
        };

        Ok(rows.iter().map(row_to_json_map).collect())
    }

    /// Close the pool, waiting for in-flight statements to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn bind_param<'q>(
    query: sqlx::query::Query<'q, sqlx::MySql, MySqlArguments>,
    param: &'q QueryParam,
) -> sqlx::query::Query<'q, sqlx::MySql, MySqlArguments> {
    match param {
        QueryParam::Null => query.bind(None::<String>),
        QueryParam::Bool(v) => query.bind(*v),
        QueryParam::Int(v) => query.bind(*v),
        QueryParam::Float(v) => query.bind(*v),
        QueryParam::String(v) => query.bind(v.as_str()),
    }
}
