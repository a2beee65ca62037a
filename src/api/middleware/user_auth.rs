//! Bearer token middleware for mutating routes

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::auth::BEARER_PREFIX;

const INVALID_BEARER_MESSAGE: &str = "Invalid or missing bearer token";

/// Reject the request unless it carries a valid bearer token.
///
/// The verified subject is not attached to the request.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let verified = {
        let header_value = bearer_header(request.headers())?;
        state.token_service.verify_bearer(header_value)
    };

    match verified {
        Ok(claims) => {
            debug!(subject = %claims.sub, "Bearer token accepted");
            Ok(next.run(request).await)
        }
        Err(e) => {
            warn!(reason = %e, "Bearer token rejected");
            Err(ApiError::unauthorized(INVALID_BEARER_MESSAGE))
        }
    }
}

/// Return the raw `Authorization` value when it has the bearer shape
fn bearer_header(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized(INVALID_BEARER_MESSAGE))?;

    match value.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.trim().is_empty() => Ok(value),
        _ => Err(ApiError::unauthorized(INVALID_BEARER_MESSAGE)),
    }
}
