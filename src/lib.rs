//! Movie Service
//!
//! CRUD over movies, directors and users with:
//! - Stateless HS256 bearer tokens gating every write
//! - Argon2id credential hashing
//! - Per-route resource preloading with typed attachments
//! - Deadline-bounded repositories over PostgreSQL or memory

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use api::state::AppState;
use crate::config::{AuthConfig, DatabaseConfig, StorageBackend};
use domain::{DomainError, RequestContext};
use infrastructure::auth::{SigningKey, TokenService};
use infrastructure::storage::{PostgresConfig, Repositories, StorageFactory};
use infrastructure::user::{Argon2Hasher, HashCost, RegisterUserRequest};

/// Build the application state from configuration.
///
/// Fails on a missing or short signing key, a hash cost below the minimum,
/// or an unreachable database.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let signing_key = load_signing_key(&config.auth).await?;
    let hash_cost = HashCost::new(config.auth.hash_cost)?;
    let token_ttl = chrono::Duration::minutes(config.auth.token_ttl_minutes);

    let repositories = create_repositories(config).await?;

    let state = AppState::new(
        repositories,
        TokenService::new(&signing_key, token_ttl),
        Arc::new(Argon2Hasher::new()),
        hash_cost,
        Duration::from_secs(config.server.request_timeout_secs),
    )?;

    bootstrap_user(&state, &config.auth).await?;

    Ok(state)
}

async fn load_signing_key(auth: &AuthConfig) -> anyhow::Result<SigningKey> {
    if let Some(secret) = &auth.signing_key {
        return Ok(SigningKey::new(secret.as_bytes())?);
    }

    if let Some(path) = &auth.signing_key_file {
        let secret = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read signing key file '{}'", path))?;
        return Ok(SigningKey::new(secret.trim_end().as_bytes())?);
    }

    Err(DomainError::configuration(
        "No signing key configured; set auth.signing_key or auth.signing_key_file",
    )
    .into())
}

async fn create_repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on restart");
            Ok(StorageFactory::in_memory())
        }
        StorageBackend::Postgres => {
            let pg_config = postgres_config(&config.database)?;
            let repositories = StorageFactory::postgres(&pg_config).await?;
            info!("Connected to PostgreSQL");
            Ok(repositories)
        }
    }
}

fn postgres_config(database: &DatabaseConfig) -> Result<PostgresConfig, DomainError> {
    let url = database
        .url
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .ok_or_else(|| {
            DomainError::configuration("No database URL; set database.url or DATABASE_URL")
        })?;

    Ok(PostgresConfig::new(url)
        .with_max_connections(database.max_connections)
        .with_min_connections(database.min_connections)
        .with_acquire_timeout(database.acquire_timeout_secs)
        .with_idle_timeout(database.idle_timeout_secs))
}

/// Create the configured first account when the user table is empty
async fn bootstrap_user(state: &AppState, auth: &AuthConfig) -> Result<(), DomainError> {
    let (Some(login), Some(password)) = (&auth.bootstrap_login, &auth.bootstrap_password) else {
        return Ok(());
    };

    let ctx = RequestContext::with_timeout(state.request_timeout);
    if state.user_service.count(&ctx).await? > 0 {
        return Ok(());
    }

    state
        .user_service
        .register(
            &ctx,
            RegisterUserRequest {
                login: login.clone(),
                password: password.clone(),
            },
        )
        .await?;

    info!(login = %login, "Created bootstrap user");
    Ok(())
}
