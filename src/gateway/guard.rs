//! Statement guard for read-only enforcement.
//!
//! Runs only on the execute-query path; introspection commands issue fixed
//! templates and bypass it. Two layers must both pass:
//!
//! 1. A coarse lexical check rejecting any statement whose lowercased text
//!    contains `drop`, `truncate`, `delete`, `update`, or `insert`. This is
//!    a substring scan, not a parser: it over-rejects (a SELECT whose
//!    string literal contains "update") and would under-reject on its own
//!    (destructive syntax outside the list).
//! 2. An AST check with [sqlparser](https://docs.rs/sqlparser/) using the
//!    MySQL dialect: every parsed statement must be a read-only kind
//!    (SELECT/VALUES, SHOW, DESCRIBE, EXPLAIN of a read-only statement).
//!    This closes the under-rejection hole; unparseable statements are
//!    rejected conservatively.

use crate::error::{GatewayError, GatewayResult};
use sqlparser::ast::Statement;
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use tracing::debug;

/// Substrings whose presence anywhere in the statement rejects it.
const BANNED_SUBSTRINGS: &[&str] = &["drop", "truncate", "delete", "update", "insert"];

/// Classify a raw SQL string as permitted or rejected.
///
/// Returns `Ok(())` for statements that pass both guard layers, otherwise
/// `Err(GatewayError::ForbiddenStatement)` with the fixed message. Empty
/// input is a validation error, not a guard rejection.
pub fn classify(sql: &str) -> GatewayResult<()> {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::validation("SQL statement must not be empty"));
    }

    let lower = trimmed.to_lowercase();
    for banned in BANNED_SUBSTRINGS {
        if lower.contains(banned) {
            debug!(substring = banned, "Statement rejected by lexical guard");
            return Err(GatewayError::ForbiddenStatement);
        }
    }

    let statements = match Parser::parse_sql(&MySqlDialect {}, trimmed) {
        Ok(statements) => statements,
        Err(e) => {
            debug!(error = %e, "Statement rejected: parse failure");
            return Err(GatewayError::ForbiddenStatement);
        }
    };

    if statements.is_empty() {
        return Err(GatewayError::validation("SQL statement must not be empty"));
    }

    for stmt in &statements {
        if !is_read_only(stmt) {
            debug!("Statement rejected by AST guard");
            return Err(GatewayError::ForbiddenStatement);
        }
    }

    Ok(())
}

/// Whether a parsed statement is a read-only kind.
fn is_read_only(stmt: &Statement) -> bool {
    match stmt {
        Statement::Query(_) => true,
        Statement::ShowTables { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowDatabases { .. }
        | Statement::ShowSchemas { .. }
        | Statement::ShowCreate { .. }
        | Statement::ShowFunctions { .. }
        | Statement::ShowVariable { .. }
        | Statement::ShowVariables { .. }
        | Statement::ShowStatus { .. }
        | Statement::ShowCollation { .. }
        | Statement::ExplainTable { .. } => true,
        // EXPLAIN is read-only exactly when the explained statement is.
        Statement::Explain { statement, .. } => is_read_only(statement),
        _ => false,
    }
}
