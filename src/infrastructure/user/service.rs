//! User service for authentication and account management

use std::fmt;
use std::sync::Arc;

use futures::TryStreamExt;
use serde::Deserialize;
use tracing::{error, info};

use crate::domain::user::validate_password;
use crate::domain::{
    DomainError, HashedCredential, Login, NewUser, Repository, RequestContext, User,
};

use super::password::{CredentialHasher, HashCost};

/// Message returned for every failed login, whatever the cause
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid login or password";

const DECOY_PASSWORD: &str = "decoy-credential-for-unknown-logins";

/// Request for registering a new user
#[derive(Clone, Deserialize)]
pub struct RegisterUserRequest {
    pub login: String,
    pub password: String,
}

impl fmt::Debug for RegisterUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterUserRequest")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// User service for authentication and management
#[derive(Debug)]
pub struct UserService {
    repository: Arc<dyn Repository<User>>,
    hasher: Arc<dyn CredentialHasher>,
    cost: HashCost,
    /// Verified against when the login is unknown so both failure paths cost one hash check
    decoy: HashedCredential,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn Repository<User>>,
        hasher: Arc<dyn CredentialHasher>,
        cost: HashCost,
    ) -> Result<Self, DomainError> {
        let decoy = hasher.hash(DECOY_PASSWORD, cost)?;

        Ok(Self {
            repository,
            hasher,
            cost,
            decoy,
        })
    }

    /// Validate, hash and store a new account
    pub async fn register(
        &self,
        ctx: &RequestContext,
        request: RegisterUserRequest,
    ) -> Result<User, DomainError> {
        let login = Login::new(request.login)?;
        validate_password(&request.password)?;

        let password_hash = self.hasher.hash(&request.password, self.cost)?;

        let user = self
            .repository
            .create(
                ctx,
                NewUser {
                    login,
                    password_hash,
                },
            )
            .await?;

        info!(login = %user.login(), "Registered user");
        Ok(user)
    }

    /// Check a login/password pair.
    ///
    /// Unknown logins, wrong passwords and unreadable stored hashes all yield
    /// the same `Unauthorized` error.
    pub async fn authenticate(
        &self,
        ctx: &RequestContext,
        login: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        let user = match Login::new(login) {
            Ok(login) => match self.repository.get_by_id(ctx, &login).await {
                Ok(user) => Some(user),
                Err(DomainError::NotFound { .. }) => None,
                Err(e) => return Err(e),
            },
            Err(_) => None,
        };

        let Some(user) = user else {
            let _ = self.hasher.verify(password, &self.decoy);
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS_MESSAGE));
        };

        match self.hasher.verify(password, user.password_hash()) {
            Ok(true) => Ok(user),
            Ok(false) => Err(DomainError::unauthorized(INVALID_CREDENTIALS_MESSAGE)),
            Err(e) => {
                error!(login = %user.login(), error = %e, "Stored credential could not be verified");
                Err(DomainError::unauthorized(INVALID_CREDENTIALS_MESSAGE))
            }
        }
    }

    /// List all users
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<User>, DomainError> {
        self.repository.get_all(ctx).await?.try_collect().await
    }

    pub async fn count(&self, ctx: &RequestContext) -> Result<u64, DomainError> {
        self.repository.count(ctx).await
    }

    /// Delete a user
    pub async fn delete(&self, ctx: &RequestContext, login: &Login) -> Result<(), DomainError> {
        self.repository.delete_by_id(ctx, login).await?;
        info!(login = %login, "Deleted user");
        Ok(())
    }
}
