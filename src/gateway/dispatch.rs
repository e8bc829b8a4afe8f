//! Command dispatcher shared by both surfaces.
//!
//! A registry mapping command names to handlers, populated once at startup
//! and immutable afterwards, so concurrent read-only invocation needs no
//! locking. The REST layer and the MCP tool layer both funnel into
//! [`Dispatcher::invoke`], which deserializes the arguments into the
//! command's typed input before calling the handler. A shape violation is
//! a validation error and the handler is never reached, so malformed input
//! fails identically on both surfaces.

use crate::error::{GatewayError, GatewayResult};
use crate::events::EventHub;
use crate::gateway::QueryGateway;
use crate::models::{
    DEFAULT_REST_LIMIT, DescribeTableArgs, ExecuteQueryArgs, ListDatabasesArgs, ListTablesArgs,
};
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Command names registered with the dispatcher.
pub const CMD_LIST_DATABASES: &str = "listDatabases";
pub const CMD_LIST_TABLES: &str = "listTables";
pub const CMD_DESCRIBE_TABLE: &str = "describeTable";
pub const CMD_EXECUTE_QUERY: &str = "executeQuery";

type CommandHandler =
    Box<dyn Fn(JsonValue) -> BoxFuture<'static, GatewayResult<JsonValue>> + Send + Sync>;

/// A named command with its handler. Owned by the dispatcher for the
/// lifetime of the process.
pub struct CommandDescriptor {
    pub name: &'static str,
    handler: CommandHandler,
}

/// The command registry backing both external surfaces.
pub struct Dispatcher {
    commands: HashMap<&'static str, CommandDescriptor>,
    events: Option<EventHub>,
}

/// Deserialize command arguments into the command's typed input.
fn parse_args<T: DeserializeOwned>(args: JsonValue) -> GatewayResult<T> {
    // A missing argument object counts as empty, matching a missing body.
    let args = if args.is_null() {
        JsonValue::Object(serde_json::Map::new())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| GatewayError::validation(e.to_string()))
}

impl Dispatcher {
    /// Build the dispatcher and register the four gateway commands.
    pub fn new(gateway: Arc<QueryGateway>) -> Self {
        let mut dispatcher = Self {
            commands: HashMap::new(),
            events: None,
        };

        {
            let gateway = gateway.clone();
            dispatcher.register(CMD_LIST_DATABASES, move |args| {
                let gateway = gateway.clone();
                Box::pin(async move {
                    let _args: ListDatabasesArgs = parse_args(args)?;
                    let databases = gateway.list_databases().await?;
                    Ok(serde_json::to_value(databases)
                        .map_err(|e| GatewayError::internal(e.to_string()))?)
                })
            });
        }

        {
            let gateway = gateway.clone();
            dispatcher.register(CMD_LIST_TABLES, move |args| {
                let gateway = gateway.clone();
                Box::pin(async move {
                    let args: ListTablesArgs = parse_args(args)?;
                    let tables = gateway.list_tables(args.database.as_deref()).await?;
                    Ok(serde_json::to_value(tables)
                        .map_err(|e| GatewayError::internal(e.to_string()))?)
                })
            });
        }

        {
            let gateway = gateway.clone();
            dispatcher.register(CMD_DESCRIBE_TABLE, move |args| {
                let gateway = gateway.clone();
                Box::pin(async move {
                    let args: DescribeTableArgs = parse_args(args)?;
                    let columns = gateway
                        .describe_table(args.database.as_deref(), &args.table)
                        .await?;
                    Ok(serde_json::to_value(columns)
                        .map_err(|e| GatewayError::internal(e.to_string()))?)
                })
            });
        }

        {
            let gateway = gateway.clone();
            dispatcher.register(CMD_EXECUTE_QUERY, move |args| {
                let gateway = gateway.clone();
                Box::pin(async move {
                    let args: ExecuteQueryArgs = parse_args(args)?;
                    let limit = args.limit.unwrap_or(DEFAULT_REST_LIMIT);
                    let offset = args.offset.unwrap_or(0);
                    let result = gateway
                        .execute_query(&args.sql, &args.params, limit, offset)
                        .await?;
                    Ok(serde_json::to_value(result)
                        .map_err(|e| GatewayError::internal(e.to_string()))?)
                })
            });
        }

        dispatcher
    }

    fn register<F>(&mut self, name: &'static str, handler: F)
    where
        F: Fn(JsonValue) -> BoxFuture<'static, GatewayResult<JsonValue>> + Send + Sync + 'static,
    {
        self.commands.insert(
            name,
            CommandDescriptor {
                name,
                handler: Box::new(handler),
            },
        );
    }

    /// Publish server-side command failures on this hub.
    pub fn with_events(mut self, events: EventHub) -> Self {
        self.events = Some(events);
        self
    }

    /// Invoke a command by name with JSON arguments.
    pub async fn invoke(&self, name: &str, args: JsonValue) -> GatewayResult<JsonValue> {
        let descriptor = self.commands.get(name).ok_or_else(|| {
            GatewayError::validation(format!("Unknown command: {}", name))
        })?;
        debug!(command = descriptor.name, "Dispatching command");
        let result = (descriptor.handler)(args).await;

        // Client mistakes (validation, guard, auth) are not server events.
        if let Err(e @ (GatewayError::Execution { .. } | GatewayError::Internal { .. })) = &result {
            if let Some(events) = &self.events {
                events.notify(crate::events::EVENT_ERROR, e.to_string());
            }
        }

        result
    }

    /// The registered command names, for diagnostics.
    pub fn command_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
