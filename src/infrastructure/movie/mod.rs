//! Movie infrastructure module

mod postgres_repository;

pub use postgres_repository::PostgresMovieRepository;
