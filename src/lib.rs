//! MySQL Query Gateway Library
//!
//! A read-only SQL query gateway over a MySQL connection pool, exposing
//! the same four commands through a REST API and MCP (Model Context
//! Protocol) tools: list databases, list tables, describe a table, and
//! execute a guarded, paginated SELECT.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod gateway;
pub mod mcp;
pub mod models;
pub mod rest;
pub mod transport;

pub use config::Config;
pub use error::{GatewayError, GatewayResult};
pub use gateway::{Dispatcher, QueryGateway};
pub use mcp::GatewayService;
