//! MCP service implementation using rmcp.
//!
//! Defines the GatewayService struct exposing the four gateway commands
//! as MCP tools. Each tool forwards through the shared command dispatcher,
//! so argument validation, the statement guard and pagination behave
//! identically to the REST surface. The one surface difference: an
//! execute_query call without an explicit limit gets a window of
//! [`DEFAULT_TOOL_LIMIT`] rows instead of the REST default.

use crate::error::GatewayError;
use crate::gateway::Dispatcher;
use crate::gateway::dispatch::{
    CMD_DESCRIBE_TABLE, CMD_EXECUTE_QUERY, CMD_LIST_DATABASES, CMD_LIST_TABLES,
};
use crate::models::{DEFAULT_TOOL_LIMIT, DescribeTableArgs, ExecuteQueryArgs, ListTablesArgs};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;

#[derive(Clone)]
pub struct GatewayService {
    /// Shared command dispatcher backing all tools
    dispatcher: Arc<Dispatcher>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl GatewayService {
    /// Create a new GatewayService over the shared dispatcher.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            tool_router: Self::tool_router(),
        }
    }

    /// Invoke a dispatcher command and render the result as a text
    /// content block.
    async fn call(&self, command: &str, args: JsonValue) -> Result<CallToolResult, McpError> {
        let result = self
            .dispatcher
            .invoke(command, args)
            .await
            .map_err(McpError::from)?;
        let text = serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::from(GatewayError::internal(e.to_string())))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_router]
impl GatewayService {
    #[tool(
        description = "Execute a read-only SQL query (SELECT only) and return paginated results.\nSupports parameterized queries with ? placeholders to prevent SQL injection.\nResults include pagination metadata (total, page, total_pages)."
    )]
    async fn execute_query(
        &self,
        Parameters(input): Parameters<ExecuteQueryArgs>,
    ) -> Result<CallToolResult, McpError> {
        let mut input = input;
        if input.limit.is_none() {
            input.limit = Some(DEFAULT_TOOL_LIMIT);
        }
        let args = serde_json::to_value(&input)
            .map_err(|e| McpError::from(GatewayError::internal(e.to_string())))?;
        self.call(CMD_EXECUTE_QUERY, args).await
    }

    #[tool(
        description = "Get the column structure of a table.\nReturns column names, types, nullability, keys and defaults in declaration order."
    )]
    async fn get_table_structure(
        &self,
        Parameters(input): Parameters<DescribeTableArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = serde_json::to_value(&input)
            .map_err(|e| McpError::from(GatewayError::internal(e.to_string())))?;
        self.call(CMD_DESCRIBE_TABLE, args).await
    }

    #[tool(description = "List all databases on the MySQL server.")]
    async fn list_databases(&self) -> Result<CallToolResult, McpError> {
        self.call(CMD_LIST_DATABASES, serde_json::json!({})).await
    }

    #[tool(
        description = "List all tables in a database.\nDefaults to the connection's configured database when none is given."
    )]
    async fn list_tables(
        &self,
        Parameters(input): Parameters<ListTablesArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = serde_json::to_value(&input)
            .map_err(|e| McpError::from(GatewayError::internal(e.to_string())))?;
        self.call(CMD_LIST_TABLES, args).await
    }
}

#[tool_handler]
impl ServerHandler for GatewayService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mysql-query-gateway".to_owned(),
                title: Some("MySQL Query Gateway".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Read-only MySQL query tools.\n\
                \n\
                ## Workflow\n\
                1. Call `list_databases` to see what is available\n\
                2. Call `list_tables` and `get_table_structure` to explore a schema\n\
                3. Call `execute_query` with a SELECT statement\n\
                \n\
                ## Rules\n\
                - Only SELECT queries are permitted; write statements are rejected\n\
                - Use ? placeholders with the `params` array for untrusted values\n\
                - Results are paginated; pass `limit` and `offset` to page through rows\n\
                  (default limit is 10 rows per call)"
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::QueryGateway;
    use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

    fn create_test_service() -> GatewayService {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_lazy_with(MySqlConnectOptions::new().host("localhost"));
        let gateway = Arc::new(QueryGateway::new(pool));
        GatewayService::new(Arc::new(Dispatcher::new(gateway)))
    }

    #[tokio::test]
    async fn test_service_creation() {
        let _service = create_test_service();
    }

    #[tokio::test]
    async fn test_server_info_advertises_tools() {
        let service = create_test_service();
        let info = service.get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, "mysql-query-gateway");
    }

    #[tokio::test]
    async fn test_execute_query_rejects_write_statement() {
        let service = create_test_service();
        let err = service
            .call(
                CMD_EXECUTE_QUERY,
                serde_json::json!({ "sql": "DROP TABLE users" }),
            )
            .await
            .unwrap_err();
        assert!(err.message.contains("Only SELECT queries are permitted"));
    }
}
