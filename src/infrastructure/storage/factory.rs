//! Repository wiring for the configured storage backend

use std::sync::Arc;

use crate::domain::{Director, DomainError, Movie, Repository, User};
use crate::infrastructure::director::PostgresDirectorRepository;
use crate::infrastructure::movie::PostgresMovieRepository;
use crate::infrastructure::user::PostgresUserRepository;

use super::in_memory::InMemoryRepository;
use super::postgres::{connect_pool, PostgresConfig};

/// One repository per entity collection
#[derive(Debug, Clone)]
pub struct Repositories {
    pub movies: Arc<dyn Repository<Movie>>,
    pub directors: Arc<dyn Repository<Director>>,
    pub users: Arc<dyn Repository<User>>,
}

/// Factory for creating repository sets
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Repositories sharing a single PostgreSQL pool
    pub async fn postgres(config: &PostgresConfig) -> Result<Repositories, DomainError> {
        let pool = connect_pool(config).await?;

        Ok(Repositories {
            movies: Arc::new(PostgresMovieRepository::new(pool.clone())),
            directors: Arc::new(PostgresDirectorRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool)),
        })
    }

    /// Process-local repositories. Data is lost on exit.
    pub fn in_memory() -> Repositories {
        Repositories {
            movies: Arc::new(InMemoryRepository::<Movie>::new()),
            directors: Arc::new(InMemoryRepository::<Director>::new()),
            users: Arc::new(InMemoryRepository::<User>::new()),
        }
    }
}
