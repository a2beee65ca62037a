//! User infrastructure module
//!
//! Password hashing with Argon2, the PostgreSQL repository and the user
//! service used for registration and login.

mod password;
mod postgres_repository;
mod service;

pub use password::{Argon2Hasher, CredentialError, CredentialHasher, HashCost};
pub use postgres_repository::PostgresUserRepository;
pub use service::{RegisterUserRequest, UserService, INVALID_CREDENTIALS_MESSAGE};

#[cfg(test)]
pub use password::MockCredentialHasher;
