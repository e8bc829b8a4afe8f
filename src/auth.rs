//! Shared-secret authentication for the REST surface.
//!
//! A single API key compared in constant time. Clients present it either
//! as the `x-api-key` header or the `apiKey` query parameter; the header
//! wins when both are present. When no key is configured the middleware
//! admits every request.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::warn;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const API_KEY_QUERY_PARAM: &str = "apiKey";

/// Authentication configuration for the REST surface.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    key: Option<String>,
}

impl AuthConfig {
    /// Create an AuthConfig from an optional shared secret. A key that is
    /// empty after trimming disables authentication, same as no key.
    pub fn from_key(key: Option<String>) -> Self {
        let key = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        Self { key }
    }

    pub fn disabled() -> Self {
        Self { key: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    fn verify(&self, provided: &str) -> bool {
        match &self.key {
            Some(expected) => constant_time_eq(provided.as_bytes(), expected.as_bytes()),
            None => true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Authentication middleware for REST requests.
pub async fn auth_middleware(
    State(auth_config): State<Arc<AuthConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !auth_config.is_enabled() {
        return next.run(request).await;
    }

    let Some(provided) = extract_api_key(&request) else {
        warn!("Authentication failed: no API key presented");
        return unauthorized_response("API key required");
    };

    if auth_config.verify(&provided) {
        next.run(request).await
    } else {
        warn!(key_prefix = %mask_key(&provided), "Authentication failed: invalid API key");
        unauthorized_response("Invalid API key")
    }
}

/// Pull the presented key from the header or, failing that, the query
/// string. Query values are percent-decoded, so a key containing
/// URL-reserved characters works on both paths.
fn extract_api_key(request: &Request<Body>) -> Option<String> {
    if let Some(value) = request.headers().get(API_KEY_HEADER) {
        if let Ok(s) = value.to_str() {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }

    let query = request.uri().query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == API_KEY_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

fn mask_key(key: &str) -> String {
    if key.len() <= 3 {
        "***".to_string()
    } else {
        format!("{}***", &key[..3])
    }
}

fn unauthorized_response(message: impl Into<String>) -> Response {
    #[derive(Serialize)]
    struct ErrorResponse {
        success: bool,
        message: String,
    }

    let body = ErrorResponse {
        success: false,
        message: message.into(),
    };
    let json = serde_json::to_string(&body)
        .unwrap_or_else(|_| r#"{"success":false,"message":"Authentication failed"}"#.to_string());

    (
        StatusCode::UNAUTHORIZED,
        [(header::CONTENT_TYPE, "application/json")],
        json,
    )
        .into_response()
}
