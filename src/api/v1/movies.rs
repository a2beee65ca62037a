//! Movie endpoint handlers

use axum::{extract::State, http::StatusCode};
use tracing::debug;

use crate::api::middleware::Loaded;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{Entity, Movie, NewMovie, RequestContext};

use super::DeletedResponse;

/// GET /api/v1/movies
pub async fn list_movies(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<Movie>>, ApiError> {
    debug!("Listing movies");

    let movies = state.movie_service.list(&ctx).await?;
    Ok(Json(movies))
}

/// POST /api/v1/movies
pub async fn create_movie(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(draft): Json<NewMovie>,
) -> Result<(StatusCode, Json<Movie>), ApiError> {
    let movie = state.movie_service.create(&ctx, draft).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

/// GET /api/v1/movies/{id}
pub async fn get_movie(Loaded(movie): Loaded<Movie>) -> Json<Movie> {
    Json(movie)
}

/// DELETE /api/v1/movies/{id}
pub async fn delete_movie(
    State(state): State<AppState>,
    ctx: RequestContext,
    Loaded(movie): Loaded<Movie>,
) -> Result<Json<DeletedResponse<i64>>, ApiError> {
    state.movie_service.delete(&ctx, movie.id()).await?;
    Ok(Json(DeletedResponse::new(*movie.id())))
}
