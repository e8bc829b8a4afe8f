//! Schema introspection built on the connection executor.
//!
//! Three fixed read templates: list databases, list tables, describe a
//! table. Database and table names never enter free-form SQL; they are
//! quoted as MySQL identifiers (backticks, embedded backticks doubled)
//! before splicing into the template, so a hostile table name cannot
//! break out of the identifier position.

use crate::db::ConnectionExecutor;
use crate::error::{GatewayError, GatewayResult};
use serde_json::Value as JsonValue;
use tracing::info;

/// Quote a name as a MySQL identifier.
pub fn quote_identifier(name: &str) -> GatewayResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::validation("identifier must not be empty"));
    }
    Ok(format!("`{}`", trimmed.replace('`', "``")))
}

/// Introspection queries over the shared executor.
#[derive(Debug, Clone)]
pub struct IntrospectionService {
    executor: ConnectionExecutor,
}

impl IntrospectionService {
    pub fn new(executor: ConnectionExecutor) -> Self {
        Self { executor }
    }

    /// List all databases visible on the server.
    pub async fn list_databases(&self) -> GatewayResult<Vec<String>> {
        let rows = self.executor.execute("SHOW DATABASES", &[]).await?;
        let names = scalar_names(rows);
        info!(count = names.len(), "Listed databases");
        Ok(names)
    }

    /// List tables, of the given database or of the connection's default.
    pub async fn list_tables(&self, database: Option<&str>) -> GatewayResult<Vec<String>> {
        let sql = match database {
            Some(db) => format!("SHOW TABLES FROM {}", quote_identifier(db)?),
            None => "SHOW TABLES".to_string(),
        };
        let rows = self.executor.execute(&sql, &[]).await?;
        let names = scalar_names(rows);
        info!(database = ?database, count = names.len(), "Listed tables");
        Ok(names)
    }

    /// Describe a table's columns, in declaration order.
    pub async fn describe_table(
        &self,
        database: Option<&str>,
        table: &str,
    ) -> GatewayResult<Vec<serde_json::Map<String, JsonValue>>> {
        let sql = match database {
            Some(db) => format!(
                "DESCRIBE {}.{}",
                quote_identifier(db)?,
                quote_identifier(table)?
            ),
            None => format!("DESCRIBE {}", quote_identifier(table)?),
        };
        let columns = self.executor.execute(&sql, &[]).await?;
        info!(
            database = ?database,
            table = %table,
            columns = columns.len(),
            "Described table"
        );
        Ok(columns)
    }
}

/// Flatten single-column rows (SHOW DATABASES / SHOW TABLES) to names.
fn scalar_names(rows: Vec<serde_json::Map<String, JsonValue>>) -> Vec<String> {
    rows.into_iter()
        .filter_map(|row| {
            row.into_iter().next().map(|(_, v)| match v {
                JsonValue::String(s) => s,
                other => other.to_string(),
            })
        })
        .collect()
}
