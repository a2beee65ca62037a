//! User endpoint handlers
//!
//! Password hashes are never serialized; responses carry the login only.

use axum::{extract::State, http::StatusCode};
use tracing::debug;

use crate::api::middleware::Loaded;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{Login, RequestContext, User};
use crate::infrastructure::user::RegisterUserRequest;

use super::DeletedResponse;

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<User>>, ApiError> {
    debug!("Listing users");

    let users = state.user_service.list(&ctx).await?;
    Ok(Json(users))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(request): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.user_service.register(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/users/{login}
pub async fn get_user(Loaded(user): Loaded<User>) -> Json<User> {
    Json(user)
}

/// DELETE /api/v1/users/{login}
pub async fn delete_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    Loaded(user): Loaded<User>,
) -> Result<Json<DeletedResponse<Login>>, ApiError> {
    state.user_service.delete(&ctx, user.login()).await?;
    Ok(Json(DeletedResponse::new(user.login().clone())))
}
