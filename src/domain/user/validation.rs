//! User validation utilities

use thiserror::Error;

use crate::domain::DomainError;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Login cannot be empty")]
    EmptyLogin,

    #[error("Login is too short. Minimum length is {0} characters")]
    LoginTooShort(usize),

    #[error("Login exceeds maximum length of {0} characters")]
    LoginTooLong(usize),

    #[error("Login contains invalid character: '{0}'. Only alphanumeric characters, underscores, and hyphens are allowed")]
    InvalidLoginCharacter(char),

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

impl From<UserValidationError> for DomainError {
    fn from(err: UserValidationError) -> Self {
        DomainError::validation(err.to_string())
    }
}

const MIN_LOGIN_LENGTH: usize = 3;
const MAX_LOGIN_LENGTH: usize = 50;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Validate a login
///
/// Rules:
/// - Cannot be empty
/// - 3 to 50 characters
/// - Only alphanumeric characters, underscores, and hyphens
pub fn validate_login(login: &str) -> Result<(), UserValidationError> {
    if login.is_empty() {
        return Err(UserValidationError::EmptyLogin);
    }

    if login.len() < MIN_LOGIN_LENGTH {
        return Err(UserValidationError::LoginTooShort(MIN_LOGIN_LENGTH));
    }

    if login.len() > MAX_LOGIN_LENGTH {
        return Err(UserValidationError::LoginTooLong(MAX_LOGIN_LENGTH));
    }

    if let Some(c) = login
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '-')
    {
        return Err(UserValidationError::InvalidLoginCharacter(c));
    }

    Ok(())
}

/// Validate a password before hashing
///
/// Length is counted in characters, not bytes.
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.is_empty() {
        return Err(UserValidationError::EmptyPassword);
    }

    if password.chars().count() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_logins() {
        assert!(validate_login("alice").is_ok());
        assert!(validate_login("user_name").is_ok());
        assert!(validate_login("user-name").is_ok());
        assert!(validate_login("User123").is_ok());
    }

    #[test]
    fn test_empty_login() {
        assert_eq!(validate_login(""), Err(UserValidationError::EmptyLogin));
    }

    #[test]
    fn test_login_too_short() {
        assert_eq!(
            validate_login("ab"),
            Err(UserValidationError::LoginTooShort(3))
        );
    }

    #[test]
    fn test_login_too_long() {
        let long_login = "a".repeat(51);
        assert_eq!(
            validate_login(&long_login),
            Err(UserValidationError::LoginTooLong(50))
        );
    }

    #[test]
    fn test_login_invalid_character() {
        assert_eq!(
            validate_login("user@name"),
            Err(UserValidationError::InvalidLoginCharacter('@'))
        );
        assert_eq!(
            validate_login("alice bob"),
            Err(UserValidationError::InvalidLoginCharacter(' '))
        );
    }

    #[test]
    fn test_valid_passwords() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("P@ssw0rd!").is_ok());
        assert!(validate_password("pässwörd").is_ok());
        assert!(validate_password("s3cret").is_ok());
        assert!(validate_password("x").is_ok());
    }

    #[test]
    fn test_empty_password_rejected() {
        assert_eq!(
            validate_password(""),
            Err(UserValidationError::EmptyPassword)
        );
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(129);
        assert_eq!(
            validate_password(&long_password),
            Err(UserValidationError::PasswordTooLong(128))
        );
    }

    #[test]
    fn test_validation_error_converts_to_domain_error() {
        let err: DomainError = UserValidationError::EmptyLogin.into();
        assert!(matches!(err, DomainError::Validation { .. }));
    }
}
