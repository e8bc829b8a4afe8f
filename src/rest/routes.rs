//! JSON route handlers.

use super::{AppState, RestError};
use crate::gateway::dispatch::{
    CMD_DESCRIBE_TABLE, CMD_EXECUTE_QUERY, CMD_LIST_DATABASES, CMD_LIST_TABLES,
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde_json::{Value as JsonValue, json};
use tracing::debug;

/// `GET /api/status` - liveness and connectivity probe, no authentication.
pub async fn status(State(state): State<AppState>) -> Json<JsonValue> {
    let database = if crate::db::test_connection(&state.pool).await {
        "connected"
    } else {
        "disconnected"
    };
    Json(json!({
        "success": true,
        "message": "Service is running",
        "database": database,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// `GET /api/databases`
pub async fn list_databases(
    State(state): State<AppState>,
) -> Result<Json<JsonValue>, RestError> {
    let data = state.dispatcher.invoke(CMD_LIST_DATABASES, json!({})).await?;
    Ok(Json(json!({ "success": true, "data": data })))
}

/// `GET /api/databases/{database}/tables`
pub async fn list_tables(
    State(state): State<AppState>,
    Path(database): Path<String>,
) -> Result<Json<JsonValue>, RestError> {
    let data = state
        .dispatcher
        .invoke(CMD_LIST_TABLES, json!({ "database": &database }))
        .await?;
    Ok(Json(
        json!({ "success": true, "database": database, "data": data }),
    ))
}

/// `GET /api/databases/{database}/tables/{table}/structure`
pub async fn table_structure(
    State(state): State<AppState>,
    Path((database, table)): Path<(String, String)>,
) -> Result<Json<JsonValue>, RestError> {
    let data = state
        .dispatcher
        .invoke(
            CMD_DESCRIBE_TABLE,
            json!({ "database": &database, "table": &table }),
        )
        .await?;
    Ok(Json(json!({
        "success": true,
        "database": database,
        "table": table,
        "data": data,
    })))
}

/// `POST /api/query`
///
/// The body is handed to the dispatcher untyped; serde validation there
/// keeps the REST and tool surfaces identical. The dispatcher returns
/// `{data, pagination}`, which is flattened into the envelope.
pub async fn execute_query(
    State(state): State<AppState>,
    Json(body): Json<JsonValue>,
) -> Result<Json<JsonValue>, RestError> {
    debug!("Handling query request");
    let result = state.dispatcher.invoke(CMD_EXECUTE_QUERY, body).await?;

    let mut envelope = serde_json::Map::new();
    envelope.insert("success".to_string(), JsonValue::Bool(true));
    if let JsonValue::Object(fields) = result {
        envelope.extend(fields);
    }
    Ok(Json(JsonValue::Object(envelope)))
}
