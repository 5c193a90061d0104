//! Authenticated user extractor.
//!
//! Provides an Axum extractor for the identity carried by a validated JWT.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::UserRole;
use shared::jwt::JwtConfig;

/// Authenticated user information from a validated JWT.
///
/// Handlers take this as a parameter to get the caller's identity. The
/// `require_auth` middleware inserts it into request extensions; the
/// extractor falls back to validating the Authorization header directly
/// so handlers also work on routes without the middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    /// Account role claim.
    pub role: UserRole,
    /// Student code claim, present only for student accounts.
    pub student_code: Option<String>,
}

impl AuthUser {
    /// Validates a token and builds the authenticated identity from its claims.
    pub fn from_token(jwt: &JwtConfig, token: &str) -> Result<Self, ApiError> {
        let claims = jwt.validate_token(token)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

        let role = claims
            .role
            .parse::<UserRole>()
            .map_err(|_| ApiError::Unauthorized("Unknown role in token".to_string()))?;

        Ok(AuthUser {
            user_id,
            role,
            student_code: claims.student_code,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // First, check if auth info was already inserted by middleware
        if let Some(auth) = parts.extensions.get::<AuthUser>() {
            return Ok(auth.clone());
        }

        // Otherwise, extract and validate the token directly
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        AuthUser::from_token(&state.jwt, token)
    }
}
