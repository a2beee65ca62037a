//! Password hashing utilities using Argon2

use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use serde::Deserialize;
use std::fmt::Debug;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::domain::{DomainError, HashedCredential};

/// Errors raised by a [`CredentialHasher`]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CredentialError {
    #[error("Failed to hash credential: {0}")]
    HashingFailed(String),

    #[error("Stored credential is malformed: {0}")]
    MalformedHash(String),
}

impl From<CredentialError> for DomainError {
    fn from(err: CredentialError) -> Self {
        DomainError::internal(err.to_string())
    }
}

/// Adaptive cost factor. For Argon2 this is the number of passes over memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u32")]
pub struct HashCost(u32);

impl HashCost {
    /// Lowest accepted cost
    pub const MIN: HashCost = HashCost(2);

    pub const DEFAULT: HashCost = HashCost(3);

    pub fn new(cost: u32) -> Result<Self, DomainError> {
        if cost < Self::MIN.0 {
            return Err(DomainError::configuration(format!(
                "Hash cost {} is below the minimum of {}",
                cost,
                Self::MIN.0
            )));
        }
        Ok(Self(cost))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for HashCost {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for HashCost {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Salted one-way hashing of passwords
#[cfg_attr(test, automock)]
pub trait CredentialHasher: Send + Sync + Debug {
    /// Hash a password with a fresh random salt
    fn hash(&self, password: &str, cost: HashCost) -> Result<HashedCredential, CredentialError>;

    /// Check a password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; only an unreadable hash is an error.
    fn verify(&self, password: &str, stored: &HashedCredential) -> Result<bool, CredentialError>;
}

/// Argon2id password hasher
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str, cost: HashCost) -> Result<HashedCredential, CredentialError> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            cost.get(),
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| CredentialError::HashingFailed(e.to_string()))?;

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| HashedCredential::new(hash.to_string()))
            .map_err(|e| CredentialError::HashingFailed(e.to_string()))
    }

    fn verify(&self, password: &str, stored: &HashedCredential) -> Result<bool, CredentialError> {
        let parsed_hash = PasswordHash::new(stored.as_str())
            .map_err(|e| CredentialError::MalformedHash(e.to_string()))?;

        // Parameters come from the stored hash, not from this instance
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::MalformedHash(e.to_string())),
        }
    }
}
