//! Authentication API endpoints
//!
//! Exchanges a login/password pair for a signed bearer token.

use std::fmt;

use axum::{extract::State, routing::post, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::RequestContext;

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Login with login and password
///
/// POST /api/v1/login
///
/// Unknown logins and wrong passwords produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .user_service
        .authenticate(&ctx, &request.login, &request.password)
        .await?;

    let issued = state
        .token_service
        .issue(user.login().as_str(), state.token_service.default_ttl())?;

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_debug_redacts_password() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"login":"alice","password":"s3cret-pass"}"#).unwrap();

        let debug = format!("{:?}", request);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("s3cret-pass"));
    }
}
