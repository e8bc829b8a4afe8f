//! Database access layer.
//!
//! This module provides the MySQL connection pool and the statement
//! executor the gateway runs everything through:
//! - Connection pool construction
//! - Parameterized statement execution
//! - Row-to-JSON type decoding

pub mod executor;
pub mod pool;
pub mod types;

pub use executor::ConnectionExecutor;
pub use pool::{build_pool, test_connection};
