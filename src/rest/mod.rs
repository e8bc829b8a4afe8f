//! REST surface: JSON routes plus the SSE event stream.
//!
//! Every route except `GET /api/status` sits behind the shared-secret
//! middleware. Handlers forward to the command dispatcher and wrap the
//! result in the response envelope: `{"success": true, ...}` on success,
//! `{"success": false, "message": ...}` with the error's HTTP status on
//! failure.

pub mod routes;
pub mod sse;

use crate::auth::{AuthConfig, auth_middleware};
use crate::error::GatewayError;
use crate::events::EventHub;
use crate::gateway::Dispatcher;
use axum::{
    Json, Router,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;

/// Shared state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub events: EventHub,
    pub pool: sqlx::MySqlPool,
}

/// Build the REST router. The status route stays outside the auth layer
/// so health checks work without the key.
pub fn router(state: AppState, auth: Arc<AuthConfig>) -> Router {
    let protected = Router::new()
        .route("/api/databases", get(routes::list_databases))
        .route("/api/databases/{database}/tables", get(routes::list_tables))
        .route(
            "/api/databases/{database}/tables/{table}/structure",
            get(routes::table_structure),
        )
        .route("/api/query", post(routes::execute_query))
        .route("/api/events", get(sse::events))
        .layer(middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(state.clone());

    Router::new()
        .route("/api/status", get(routes::status))
        .with_state(state)
        .merge(protected)
}

/// Gateway error carried through an axum handler.
pub struct RestError(pub GatewayError);

impl From<GatewayError> for RestError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let mut body = serde_json::json!({
            "success": false,
            "message": self.0.to_string(),
        });
        if let Some(cause) = self.0.cause() {
            body["error"] = serde_json::Value::String(cause.to_string());
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_rest_error_statuses() {
        let cases = [
            (GatewayError::validation("bad"), StatusCode::BAD_REQUEST),
            (GatewayError::ForbiddenStatement, StatusCode::FORBIDDEN),
            (
                GatewayError::authentication("nope"),
                StatusCode::UNAUTHORIZED,
            ),
            (
                GatewayError::execution("boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let response = RestError(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
