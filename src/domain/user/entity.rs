//! User entity and related types

use serde::{Deserialize, Serialize};

use super::validation::{validate_login, UserValidationError};
use crate::domain::traits::Entity;
use crate::domain::DomainError;

/// Account login - alphanumeric, underscores and hyphens, 3 to 50 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Login(String);

impl Login {
    /// Create a new Login after validation
    pub fn new(login: impl Into<String>) -> Result<Self, UserValidationError> {
        let login = login.into();
        validate_login(&login)?;
        Ok(Self(login))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Login {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Login> for String {
    fn from(login: Login) -> Self {
        login.0
    }
}

impl std::fmt::Display for Login {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// PHC-format password hash. Parameters and salt travel inside the string.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedCredential(String);

impl HashedCredential {
    /// Wrap a stored hash. Format problems surface at verification time.
    pub fn new(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for HashedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HashedCredential([REDACTED])")
    }
}

/// User account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    login: Login,
    /// Never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: HashedCredential,
}

impl User {
    pub fn new(login: Login, password_hash: HashedCredential) -> Self {
        Self {
            login,
            password_hash,
        }
    }

    pub fn from_draft(draft: NewUser) -> Self {
        Self::new(draft.login, draft.password_hash)
    }

    pub fn login(&self) -> &Login {
        &self.login
    }

    pub fn password_hash(&self) -> &HashedCredential {
        &self.password_hash
    }
}

impl Entity for User {
    type Id = Login;
    type Draft = NewUser;

    const KIND: &'static str = "user";

    fn id(&self) -> &Login {
        &self.login
    }

    fn parse_id(raw: &str) -> Result<Login, DomainError> {
        Login::new(raw).map_err(|e| DomainError::invalid_id(e.to_string()))
    }
}

/// An account ready to be stored: the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: Login,
    pub password_hash: HashedCredential,
}
