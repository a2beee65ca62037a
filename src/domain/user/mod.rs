//! User domain
//!
//! Accounts are keyed by login and hold only the hashed credential; the
//! plaintext password never reaches this layer.

mod entity;
mod validation;

pub use entity::{HashedCredential, Login, NewUser, User};
pub use validation::{validate_login, validate_password, UserValidationError};
