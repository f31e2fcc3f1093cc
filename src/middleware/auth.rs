use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::AppConfig;
use crate::error::AppError;

/// Middleware that checks for a Bearer token in the Authorization header.
///
/// If `security.auth_token` is configured, every request passing through this
/// layer must carry a matching `Authorization: Bearer <token>` header. Without
/// a token the middleware is a no-op.
pub async fn auth_middleware(State(cfg): State<Arc<AppConfig>>, req: Request, next: Next) -> Response {
    let Some(expected_token) = cfg.auth_token() else {
        return next.run(req).await;
    };

    let provided = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if constant_time_eq(token.as_bytes(), expected_token.as_bytes()) => next.run(req).await,
        Some(_) => AppError::Unauthorized("Invalid bearer token".to_string()).into_response(),
        None => AppError::Unauthorized("Missing bearer token".to_string()).into_response(),
    }
}

/// Length leaks, content does not.
fn constant_time_eq(provided: &[u8], expected: &[u8]) -> bool {
    if provided.len() != expected.len() {
        return false;
    }
    let mut diff = 0u8;
    for (a, b) in provided.iter().zip(expected.iter()) {
        diff |= a ^ b;
    }
    diff == 0
}
