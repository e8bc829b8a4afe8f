//! MCP surface built on the rmcp framework.

pub mod service;

pub use service::GatewayService;
