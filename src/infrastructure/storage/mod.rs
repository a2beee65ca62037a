//! Storage infrastructure - pooling, error mapping and the in-memory backend

mod factory;
mod in_memory;
mod postgres;

pub use factory::{Repositories, StorageFactory};
pub use in_memory::{InMemoryRecord, InMemoryRepository};
pub use postgres::{connect_pool, map_sqlx_error, PostgresConfig};
