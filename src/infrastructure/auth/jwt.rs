//! Bearer token issuance and verification (HS256 JWT)

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

use crate::domain::DomainError;

/// The only algorithm tokens may declare
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Scheme prefix of the `Authorization` header value
pub const BEARER_PREFIX: &str = "Bearer ";

/// Shortest signing key accepted at startup
pub const MIN_SIGNING_KEY_BYTES: usize = 32;

/// Reference token lifetime
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Reasons a presented token is refused
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token signature does not verify")]
    BadSignature,

    #[error("Token has expired")]
    Expired,
}

/// Claims carried by every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (login)
    pub sub: String,
    /// Expiration timestamp (Unix seconds)
    pub exp: i64,
    /// Issued at timestamp (Unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// A freshly signed token
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// HMAC secret shared by issuance and verification
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, DomainError> {
        let secret = secret.into();
        if secret.len() < MIN_SIGNING_KEY_BYTES {
            return Err(DomainError::configuration(format!(
                "Signing key must be at least {} bytes, got {}",
                MIN_SIGNING_KEY_BYTES,
                secret.len()
            )));
        }
        Ok(Self(secret))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey([hidden])")
    }
}

/// Header fields inspected before any signature work
#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Issues and verifies signed, time-bounded bearer tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &TOKEN_ALGORITHM)
            .field("default_ttl", &self.default_ttl)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl TokenService {
    pub fn new(key: &SigningKey, default_ttl: Duration) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // Expiry is checked against the caller's clock with no leeway
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            validation,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Sign a token for `subject` valid for `ttl`. A negative ttl yields an
    /// already-expired token.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<IssuedToken, DomainError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, DomainError> {
        let expires_at = now + ttl;
        let claims = TokenClaims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            iat: Some(now.timestamp()),
        };

        let token = encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a full `Authorization` header value
    pub fn verify_bearer(&self, header_value: &str) -> Result<TokenClaims, TokenError> {
        let token = header_value
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(|| TokenError::Malformed("missing Bearer scheme".to_string()))?;

        self.verify(token.trim())
    }

    /// Verify `token` as of `now`.
    ///
    /// The declared algorithm is checked on the raw header first, so tokens
    /// naming any other algorithm are refused without signature work.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let algorithm = declared_algorithm(token)?;
        if algorithm != "HS256" {
            return Err(TokenError::UnsupportedAlgorithm(algorithm));
        }

        let data =
            decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidSignature => TokenError::BadSignature,
                    ErrorKind::InvalidAlgorithm => {
                        TokenError::UnsupportedAlgorithm(algorithm.clone())
                    }
                    _ => TokenError::Malformed(e.to_string()),
                }
            })?;

        if data.claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

fn declared_algorithm(token: &str) -> Result<String, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments[0].is_empty() || segments[1].is_empty() {
        return Err(TokenError::Malformed(
            "expected three dot-separated segments".to_string(),
        ));
    }

    let header = URL_SAFE_NO_PAD
        .decode(segments[0])
        .map_err(|e| TokenError::Malformed(format!("header is not base64url: {}", e)))?;

    let header: RawHeader = serde_json::from_slice(&header)
        .map_err(|e| TokenError::Malformed(format!("header is not valid JSON: {}", e)))?;

    Ok(header.alg)
}
