//! Resource preloading for `/{entity}/{id}` routes

use axum::{
    extract::{rejection::PathRejection, FromRequestParts, Path, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};

use crate::api::state::{AppState, ResourceSource};
use crate::api::types::ApiError;
use crate::domain::{DomainError, Entity, RequestContext};

/// An entity resolved from the path before the handler ran.
///
/// Extracting it removes it from the request, so it is consumed once.
#[derive(Debug, Clone)]
pub struct Loaded<E>(pub E);

/// Resolve the `{id}` path segment into `Loaded<E>`.
///
/// Undecodable, malformed and unknown identifiers answer 404 and the handler
/// never runs.
pub async fn load_resource<E>(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    ctx: RequestContext,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    E: Entity,
    AppState: ResourceSource<E>,
{
    let raw_id = match path {
        Ok(Path(raw_id)) => raw_id,
        Err(rejection) => {
            debug!(kind = E::KIND, error = %rejection, "Undecodable resource id");
            return Err(ApiError::not_found(format!("{} not found", E::KIND)));
        }
    };

    let Ok(id) = E::parse_id(&raw_id) else {
        debug!(kind = E::KIND, id = %raw_id, "Unparseable resource id");
        return Err(not_found::<E>(&raw_id));
    };

    let repository = <AppState as ResourceSource<E>>::resource_repository(&state);
    let entity = match repository.get_by_id(&ctx, &id).await {
        Ok(entity) => entity,
        Err(DomainError::NotFound { .. }) => return Err(not_found::<E>(&raw_id)),
        Err(e) => return Err(e.into()),
    };

    request.extensions_mut().insert(Loaded(entity));
    Ok(next.run(request).await)
}

fn not_found<E: Entity>(raw_id: &str) -> ApiError {
    ApiError::not_found(format!("{} '{}' not found", E::KIND, raw_id))
}

impl<S, E> FromRequestParts<S> for Loaded<E>
where
    S: Send + Sync,
    E: Entity,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.remove::<Loaded<E>>().ok_or_else(|| {
            error!(kind = E::KIND, "Loaded resource missing; route lacks load_resource");
            ApiError::internal("Internal server error")
        })
    }
}
