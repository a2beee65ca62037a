//! Director endpoint handlers

use axum::{extract::State, http::StatusCode};
use tracing::debug;

use crate::api::middleware::Loaded;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{Director, Entity, NewDirector, RequestContext};

use super::DeletedResponse;

/// GET /api/v1/directors
pub async fn list_directors(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<Director>>, ApiError> {
    debug!("Listing directors");

    let directors = state.director_service.list(&ctx).await?;
    Ok(Json(directors))
}

/// POST /api/v1/directors
pub async fn create_director(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(draft): Json<NewDirector>,
) -> Result<(StatusCode, Json<Director>), ApiError> {
    let director = state.director_service.create(&ctx, draft).await?;
    Ok((StatusCode::CREATED, Json(director)))
}

/// GET /api/v1/directors/{id}
pub async fn get_director(Loaded(director): Loaded<Director>) -> Json<Director> {
    Json(director)
}

/// DELETE /api/v1/directors/{id}
///
/// Fails with 409 while movies still reference the director.
pub async fn delete_director(
    State(state): State<AppState>,
    ctx: RequestContext,
    Loaded(director): Loaded<Director>,
) -> Result<Json<DeletedResponse<i64>>, ApiError> {
    state.director_service.delete(&ctx, director.id()).await?;
    Ok(Json(DeletedResponse::new(*director.id())))
}
