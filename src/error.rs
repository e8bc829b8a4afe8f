//! Error types for the query gateway.
//!
//! This module defines the gateway error taxonomy using `thiserror`. Each
//! variant maps to one HTTP status on the REST surface and one MCP error
//! code on the tool surface, so both surfaces stay consistent.

use axum::http::StatusCode;
use thiserror::Error;

/// Fixed message returned whenever the statement guard rejects a query.
pub const FORBIDDEN_STATEMENT_MESSAGE: &str = "Only SELECT queries are permitted";

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing or malformed command arguments. Never retried.
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Statement guard rejection. Carries the fixed explanatory message.
    #[error("{FORBIDDEN_STATEMENT_MESSAGE}")]
    ForbiddenStatement,

    /// Missing or invalid shared-secret key. Short-circuits before dispatch.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Driver or connection failure surfaced from the database round-trip.
    #[error("Query execution failed: {message}")]
    Execution {
        message: String,
        cause: Option<String>,
    },

    /// Unclassified process-level failure.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GatewayError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create an execution error without an underlying cause.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            cause: None,
        }
    }

    /// Create an execution error with the underlying driver message.
    pub fn execution_with_cause(message: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The HTTP status this error maps to on the REST surface.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::ForbiddenStatement => StatusCode::FORBIDDEN,
            Self::Authentication { .. } => StatusCode::UNAUTHORIZED,
            Self::Execution { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The underlying driver message, when one exists.
    pub fn cause(&self) -> Option<&str> {
        match self {
            Self::Execution { cause, .. } => cause.as_deref(),
            _ => None,
        }
    }
}

/// Convert sqlx errors to GatewayError.
///
/// Everything the driver reports is an execution failure from the gateway's
/// point of view; the original driver message is preserved as the cause.
impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => GatewayError::Execution {
                message: db_err.message().to_string(),
                cause: db_err.code().map(|c| format!("SQLSTATE {}", c)),
            },
            sqlx::Error::PoolTimedOut => GatewayError::execution_with_cause(
                "Timed out acquiring a database connection",
                "connection pool exhausted",
            ),
            sqlx::Error::PoolClosed => GatewayError::execution("Connection pool is closed"),
            sqlx::Error::Io(io_err) => {
                GatewayError::execution_with_cause("Database I/O error", io_err.to_string())
            }
            sqlx::Error::ColumnDecode { index, source } => GatewayError::execution_with_cause(
                format!("Failed to decode column {}", index),
                source.to_string(),
            ),
            other => GatewayError::execution(other.to_string()),
        }
    }
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Convert GatewayError to MCP ErrorData so tool callers see the same
/// taxonomy the REST surface does.
impl From<GatewayError> for rmcp::ErrorData {
    fn from(err: GatewayError) -> Self {
        match &err {
            GatewayError::Validation { .. } | GatewayError::ForbiddenStatement => {
                rmcp::ErrorData::invalid_params(err.to_string(), None)
            }
            GatewayError::Authentication { .. } => {
                rmcp::ErrorData::invalid_request(err.to_string(), None)
            }
            GatewayError::Execution { cause, .. } => rmcp::ErrorData::internal_error(
                err.to_string(),
                cause.as_ref().map(|c| serde_json::json!({ "cause": c })),
            ),
            GatewayError::Internal { .. } => rmcp::ErrorData::internal_error(err.to_string(), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_message_is_fixed() {
        let err = GatewayError::ForbiddenStatement;
        assert_eq!(err.to_string(), FORBIDDEN_STATEMENT_MESSAGE);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            GatewayError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::authentication("no key").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::execution("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_execution_cause_preserved() {
        let err = GatewayError::execution_with_cause("query failed", "syntax error");
        assert_eq!(err.cause(), Some("syntax error"));
    }

    #[test]
    fn test_validation_maps_to_invalid_params() {
        let mcp_err: rmcp::ErrorData = GatewayError::validation("bad input").into();
        // invalid_params uses -32602
        assert_eq!(mcp_err.code.0, -32602);
    }

    #[test]
    fn test_forbidden_maps_to_invalid_params() {
        let mcp_err: rmcp::ErrorData = GatewayError::ForbiddenStatement.into();
        assert_eq!(mcp_err.code.0, -32602);
    }

    #[test]
    fn test_execution_maps_to_internal_error() {
        let mcp_err: rmcp::ErrorData =
            GatewayError::execution_with_cause("failed", "disk on fire").into();
        // internal_error uses -32603
        assert_eq!(mcp_err.code.0, -32603);
        let data = mcp_err.data.unwrap();
        assert_eq!(data["cause"], "disk on fire");
    }

    #[test]
    fn test_pool_timeout_becomes_execution() {
        let err: GatewayError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, GatewayError::Execution { .. }));
    }
}
