//! Per-request deadline

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::RequestContext;

/// Start the request clock and answer 504 if the pipeline outlives it.
///
/// The `RequestContext` inserted here is what handlers and middlewares pass
/// to repositories. Dropping the pipeline future on expiry abandons any
/// in-flight query.
pub async fn request_deadline(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let ctx = RequestContext::with_timeout(state.request_timeout);
    request.extensions_mut().insert(ctx);

    match tokio::time::timeout_at(ctx.deadline(), next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(
                timeout_ms = state.request_timeout.as_millis() as u64,
                "Request deadline exceeded"
            );
            ApiError::timeout("Request deadline exceeded").into_response()
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestContext>().copied().ok_or_else(|| {
            error!("RequestContext missing; deadline middleware not installed on this route");
            ApiError::internal("Internal server error")
        })
    }
}
