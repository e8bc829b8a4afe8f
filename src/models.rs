//! Data models shared by both command surfaces.
//!
//! Command inputs derive both `Deserialize` (so the dispatcher validates
//! REST bodies and tool arguments with identical serde semantics) and
//! `JsonSchema` (so the MCP tools can declare their parameter schemas).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Default row limit on the REST surface.
pub const DEFAULT_REST_LIMIT: u64 = 100;

/// Default row limit on the tool surface.
pub const DEFAULT_TOOL_LIMIT: u64 = 10;

/// A positional bind parameter for parameterized queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum QueryParam {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (stored as i64 for maximum range)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
}

impl QueryParam {
    /// Get the type name of this parameter for debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }
}

/// Arguments for the `executeQuery` command.
///
/// `limit` is optional here; each surface applies its own default before
/// dispatch (100 on REST, 10 on the tool surface).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteQueryArgs {
    /// SQL SELECT statement to execute. Write operations are rejected.
    pub sql: String,
    /// Positional parameters for `?` placeholders in the SQL
    #[serde(default)]
    pub params: Vec<QueryParam>,
    /// Maximum rows to return (must be greater than zero)
    #[serde(default)]
    pub limit: Option<u64>,
    /// Number of rows to skip
    #[serde(default)]
    pub offset: Option<u64>,
}

/// Arguments for the `listTables` command.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListTablesArgs {
    /// Database name. Omit to list tables of the connection's default database.
    #[serde(default)]
    pub database: Option<String>,
}

/// Arguments for the `describeTable` command.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DescribeTableArgs {
    /// Database containing the table. Omit to use the connection's default database.
    #[serde(default)]
    pub database: Option<String>,
    /// Name of the table to describe
    pub table: String,
}

/// Arguments for the `listDatabases` command (none).
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListDatabasesArgs {}

/// Pagination metadata attached to every `executeQuery` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Pagination {
    /// Row count of the statement without pagination clauses
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    /// 1-based page number: floor(offset / limit) + 1
    pub page: u64,
    /// ceil(total / limit)
    pub total_pages: u64,
}

impl Pagination {
    /// Derive pagination metadata from a total count and the requested window.
    ///
    /// `limit` is guaranteed non-zero by the rewriter's input validation.
    pub fn new(total: u64, limit: u64, offset: u64) -> Self {
        Self {
            total,
            limit,
            offset,
            page: offset / limit + 1,
            total_pages: total.div_ceil(limit),
        }
    }
}

/// Result of a paginated `executeQuery` command.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PagedResult {
    /// The paginated row subset
    pub data: Vec<serde_json::Map<String, JsonValue>>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_untagged_deserialization() {
        let params: Vec<QueryParam> = serde_json::from_str(r#"[null, true, 42, 1.5, "x"]"#).unwrap();
        assert_eq!(params[0], QueryParam::Null);
        assert_eq!(params[1], QueryParam::Bool(true));
        assert_eq!(params[2], QueryParam::Int(42));
        assert_eq!(params[3], QueryParam::Float(1.5));
        assert_eq!(params[4], QueryParam::String("x".to_string()));
    }

    #[test]
    fn test_pagination_math() {
        let p = Pagination::new(5, 2, 0);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 3);

        let p = Pagination::new(5, 2, 4);
        assert_eq!(p.page, 3);
        assert_eq!(p.total_pages, 3);
    }

    #[test]
    fn test_pagination_empty_result() {
        let p = Pagination::new(0, 10, 0);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.page, 1);
    }

    #[test]
    fn test_execute_query_args_defaults() {
        let args: ExecuteQueryArgs =
            serde_json::from_str(r#"{"sql": "SELECT 1"}"#).unwrap();
        assert!(args.params.is_empty());
        assert_eq!(args.limit, None);
        assert_eq!(args.offset, None);
    }

    #[test]
    fn test_execute_query_args_rejects_missing_sql() {
        let result: Result<ExecuteQueryArgs, _> = serde_json::from_str(r#"{"limit": 10}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_execute_query_args_rejects_negative_limit() {
        let result: Result<ExecuteQueryArgs, _> =
            serde_json::from_str(r#"{"sql": "SELECT 1", "limit": -5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_describe_table_args_requires_table() {
        let result: Result<DescribeTableArgs, _> =
            serde_json::from_str(r#"{"database": "shop"}"#);
        assert!(result.is_err());
    }
}
