//! Authentication infrastructure module
//!
//! Signed bearer tokens for stateless request authentication.

mod jwt;

pub use jwt::{
    IssuedToken, SigningKey, TokenClaims, TokenError, TokenService, BEARER_PREFIX,
    DEFAULT_TOKEN_TTL_MINUTES, MIN_SIGNING_KEY_BYTES, TOKEN_ALGORITHM,
};
