//! Application state for shared services

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Director, DomainError, Entity, Movie, Repository, User};
use crate::infrastructure::auth::TokenService;
use crate::infrastructure::services::CatalogService;
use crate::infrastructure::storage::Repositories;
use crate::infrastructure::user::{CredentialHasher, HashCost, UserService};

/// Shared, cheaply cloned handles used by every request
#[derive(Debug, Clone)]
pub struct AppState {
    pub repositories: Repositories,
    pub movie_service: Arc<CatalogService<Movie>>,
    pub director_service: Arc<CatalogService<Director>>,
    pub user_service: Arc<UserService>,
    pub token_service: Arc<TokenService>,
    /// Overall budget for one request
    pub request_timeout: Duration,
}

impl AppState {
    /// Wire services on top of the given repositories
    pub fn new(
        repositories: Repositories,
        token_service: TokenService,
        hasher: Arc<dyn CredentialHasher>,
        hash_cost: HashCost,
        request_timeout: Duration,
    ) -> Result<Self, DomainError> {
        let user_service = UserService::new(repositories.users.clone(), hasher, hash_cost)?;

        Ok(Self {
            movie_service: Arc::new(CatalogService::new(repositories.movies.clone())),
            director_service: Arc::new(CatalogService::new(repositories.directors.clone())),
            user_service: Arc::new(user_service),
            token_service: Arc::new(token_service),
            repositories,
            request_timeout,
        })
    }
}

/// Lookup used by the resource preloading middleware
pub trait ResourceSource<E: Entity> {
    fn resource_repository(&self) -> &Arc<dyn Repository<E>>;
}

impl ResourceSource<Movie> for AppState {
    fn resource_repository(&self) -> &Arc<dyn Repository<Movie>> {
        &self.repositories.movies
    }
}

impl ResourceSource<Director> for AppState {
    fn resource_repository(&self) -> &Arc<dyn Repository<Director>> {
        &self.repositories.directors
    }
}

impl ResourceSource<User> for AppState {
    fn resource_repository(&self) -> &Arc<dyn Repository<User>> {
        &self.repositories.users
    }
}
