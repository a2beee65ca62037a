//! Catalog v1 API endpoints

pub mod directors;
pub mod movies;
pub mod users;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, MethodRouter},
    Router,
};
use serde::Serialize;

use super::auth;
use super::middleware::{load_resource, require_bearer};
use super::state::{AppState, ResourceSource};
use crate::domain::{Director, Entity, Movie, User};

/// Body returned by every delete endpoint
#[derive(Debug, Serialize)]
pub struct DeletedResponse<I> {
    pub deleted: bool,
    pub id: I,
}

impl<I> DeletedResponse<I> {
    pub fn new(id: I) -> Self {
        Self { deleted: true, id }
    }
}

/// Create v1 API router.
///
/// Every POST and DELETE sits behind the bearer check; item routes resolve
/// their `{id}` before the handler runs.
pub fn create_v1_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(auth::create_auth_router())
        .route(
            "/movies",
            get(movies::list_movies).merge(protected(state, post(movies::create_movie))),
        )
        .route(
            "/movies/{id}",
            with_resource::<Movie>(state, get(movies::get_movie)).merge(protected(
                state,
                with_resource::<Movie>(state, delete(movies::delete_movie)),
            )),
        )
        .route(
            "/directors",
            get(directors::list_directors)
                .merge(protected(state, post(directors::create_director))),
        )
        .route(
            "/directors/{id}",
            with_resource::<Director>(state, get(directors::get_director)).merge(protected(
                state,
                with_resource::<Director>(state, delete(directors::delete_director)),
            )),
        )
        .route(
            "/users",
            get(users::list_users).merge(protected(state, post(users::create_user))),
        )
        .route(
            "/users/{login}",
            with_resource::<User>(state, get(users::get_user)).merge(protected(
                state,
                with_resource::<User>(state, delete(users::delete_user)),
            )),
        )
}

/// Require a valid bearer token. Layers added later run first, so wrapping
/// a resource route here checks the token before the lookup.
fn protected(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.layer(from_fn_with_state(state.clone(), require_bearer))
}

fn with_resource<E>(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState>
where
    E: Entity,
    AppState: ResourceSource<E>,
{
    route.layer(from_fn_with_state(state.clone(), load_resource::<E>))
}
