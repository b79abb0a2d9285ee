//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::models::User;
use crate::common::{safe_email_log, ApiError, AppState};
use crate::services::{Claims, TokenError};

/// Authenticated user extractor
///
/// Validates the bearer JWT and loads the account from the database. Guest
/// tokens are valid credentials but carry no identity, so they are turned
/// away here - routes that admit guests use [`ReadAccess`] instead.
#[derive(Debug)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub is_admin: bool,
}

/// Any-valid-token extractor for read-style endpoints.
///
/// Accepts user, admin, and guest tokens alike; `user_id` is None for
/// guests.
#[derive(Debug)]
pub struct ReadAccess {
    pub user_id: Option<String>,
    pub role: String,
}

/// Pull the bearer token out of the Authorization header.
/// Accepts both "Bearer <token>" and a raw token.
fn bearer_token(parts: &Parts) -> Result<String, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match header {
        Some(value) => {
            let token = value.strip_prefix("Bearer ").unwrap_or(value);
            Ok(token.to_string())
        }
        None => {
            warn!("Authentication failed: missing Authorization header");
            Err(ApiError::Unauthorized("missing auth".into()))
        }
    }
}

/// Decode a token, mapping expiry to its own message so clients can react
/// by refreshing or requesting a new guest token
fn decode_claims(state: &AppState, token: &str) -> Result<Claims, ApiError> {
    state.tokens.decode(token).map_err(|e| match e {
        TokenError::Expired => {
            warn!("Token validation failed: expired");
            ApiError::Unauthorized("token expired".into())
        }
        _ => {
            warn!("Token validation failed: invalid");
            ApiError::Unauthorized("invalid token".into())
        }
    })
}

async fn load_user(state: &AppState, user_id: &str) -> Result<User, ApiError> {
    let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                user_id = %user_id,
                "Database error during user lookup in authentication"
            );
            ApiError::DatabaseError(e)
        })?;

    match user {
        Some(u) => Ok(u),
        None => {
            warn!(user_id = %user_id, "Authentication failed: user not found in database");
            Err(ApiError::Unauthorized("user not found".into()))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Internal("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let token = bearer_token(parts)?;
        let claims = decode_claims(&app_state, &token)?;

        let user_id = match claims.sub {
            Some(id) => id,
            None => {
                // Valid signature, but a guest token has no account behind it
                warn!("Guest token presented on an account-holder route");
                return Err(ApiError::Forbidden(
                    "Guest access is read-only".to_string(),
                ));
            }
        };

        let user = load_user(&app_state, &user_id).await?;
        let is_admin = user.role == "admin";

        debug!(
            user_id = %user.id,
            email = %safe_email_log(&user.email),
            role = %user.role,
            "User authentication successful via extractor"
        );

        Ok(AuthedUser {
            id: user.id,
            email: user.email,
            role: user.role,
            is_admin,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ReadAccess
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Internal("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let token = bearer_token(parts)?;
        let claims = decode_claims(&app_state, &token)?;

        match claims.sub {
            Some(user_id) => {
                let user = load_user(&app_state, &user_id).await?;
                Ok(ReadAccess {
                    user_id: Some(user.id),
                    role: user.role,
                })
            }
            None => match claims.role.as_deref() {
                Some("guest") => {
                    debug!("Guest token accepted for read access");
                    Ok(ReadAccess {
                        user_id: None,
                        role: "guest".to_string(),
                    })
                }
                _ => {
                    warn!("Token carries neither a subject nor the guest role");
                    Err(ApiError::Unauthorized("invalid token".into()))
                }
            },
        }
    }
}
