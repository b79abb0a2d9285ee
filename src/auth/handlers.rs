//! Authentication handlers
//!
//! Each handler is one self-contained transition: validate shape, consult
//! the credential store, drive the hasher/issuer/codec, shape the response.

use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use chrono::{Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::extractors::AuthedUser;
use super::models::{
    ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest, UpdateUserRequest,
    User, VerifyTokenRequest,
};
use super::validators;
use crate::common::{generate_user_id, safe_email_log, ApiError, AppState};
use crate::services::google::{GoogleError, GoogleProfile};
use crate::services::password;

/// Reset tokens are valid for five minutes from issue
const RESET_TOKEN_TTL_MINUTES: i64 = 5;

async fn find_user_by_email(state: &AppState, email: &str) -> Result<Option<User>, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)
}

async fn find_user_by_id(state: &AppState, id: &str) -> Result<Option<User>, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)
}

fn encrypt_profile(
    state: &AppState,
    profile: &serde_json::Value,
) -> Result<crate::services::EncryptedEnvelope, ApiError> {
    state.codec.encrypt(profile).map_err(|e| {
        error!(error = %e, "Failed to encrypt profile envelope");
        ApiError::Internal("Failed to encrypt user data".to_string())
    })
}

// ============================================================================
// Signup / Login
// ============================================================================

/// POST /api/auth/users/signup
/// Creates a local account; the response envelope omits the record id
pub async fn signup(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = validators::validate_signup(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    if find_user_by_email(&state, &payload.email).await?.is_some() {
        warn!(
            email = %safe_email_log(&payload.email),
            "Signup rejected: email already registered"
        );
        return Err(ApiError::Conflict("Email is already registered".to_string()));
    }

    let id = generate_user_id();
    let role = payload.role.as_deref().unwrap_or("user");

    // Explicit save pipeline: validate, hash, persist. The digest is
    // computed here and only here - no hidden persistence hook.
    let digest = password::hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "Password hashing failed during signup");
        ApiError::Internal("Failed to create account".to_string())
    })?;

    sqlx::query(
        "INSERT INTO users (id, name, email, password, role, login_type) VALUES (?, ?, ?, ?, ?, 'local')",
    )
    .bind(&id)
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&digest)
    .bind(role)
    .execute(&state.db)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::Conflict("Email is already registered".to_string())
        } else {
            ApiError::DatabaseError(e)
        }
    })?;

    let user = find_user_by_id(&state, &id)
        .await?
        .ok_or_else(|| ApiError::Internal("Failed to load created account".to_string()))?;

    state
        .activity
        .record(Some(&id), "signup", &format!("New {} account registered", role))
        .await;

    info!(
        user_id = %id,
        email = %safe_email_log(&payload.email),
        role = %role,
        "Local account created"
    );

    let envelope = encrypt_profile(&state, &user.signup_profile())?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Account created successfully",
            "user": envelope,
        })),
    ))
}

/// POST /api/auth/users/login
/// Authenticates a local account and returns tokens plus the envelope.
///
/// Unknown email and wrong password take the same exit so responses never
/// reveal which half was wrong.
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = match find_user_by_email(&state, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(
                email = %safe_email_log(&payload.email),
                "Login failed: unknown email"
            );
            return Err(ApiError::InvalidCredentials);
        }
    };

    // OAuth-provisioned accounts have no digest; verification fails the
    // same way a wrong password does
    let digest = user.password.as_deref().unwrap_or("");
    if !password::verify_password(&payload.password, digest) {
        warn!(
            user_id = %user.id,
            "Login failed: password mismatch"
        );
        return Err(ApiError::InvalidCredentials);
    }

    let access_token = state
        .tokens
        .issue_access(&user.id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let refresh_token = state
        .tokens
        .issue_refresh(&user.id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let envelope = encrypt_profile(&state, &user.envelope_profile())?;

    state
        .activity
        .record(Some(&user.id), "login", "Signed in with email and password")
        .await;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User login successful"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Login successful",
        "accessToken": access_token,
        "refreshToken": refresh_token,
        "user": envelope,
    })))
}

// ============================================================================
// Account management
// ============================================================================

/// GET /api/auth/users/get-all-user - Admin-only user listing
pub async fn get_all_users(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();

    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(
        admin_user_id = %authed.id,
        user_count = users.len(),
        "User list fetched"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "users": users,
    })))
}

/// PUT /api/auth/users/update-user/:userId
/// Updates a profile under the role field-permission table; password
/// changes ride the explicit validate -> verify -> hash -> persist pipeline
pub async fn update_user(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let target = find_user_by_id(&state, &user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let is_own_record = authed.id == target.id;
    validators::authorize_update(&authed.role, is_own_record, &payload)?;

    let validation = validators::validate_password_change(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    // Conditional hash: only a requested password change touches the digest
    let new_digest = match &payload.new_password {
        Some(new_password) => {
            let old_password = payload.old_password.as_deref().unwrap_or("");
            let stored = target.password.as_deref().unwrap_or("");
            if !password::verify_password(old_password, stored) {
                warn!(
                    user_id = %target.id,
                    "Password change rejected: old password mismatch"
                );
                return Err(ApiError::Validation(vec![crate::common::ValidationError {
                    field: "oldPassword".to_string(),
                    message: "Old password is incorrect".to_string(),
                }]));
            }

            Some(password::hash_password(new_password).map_err(|e| {
                error!(error = %e, "Password hashing failed during update");
                ApiError::Internal("Failed to update password".to_string())
            })?)
        }
        None => None,
    };

    // Build dynamic update; name/email/role apply independently of the
    // password change
    let mut updates: Vec<&str> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation(vec![crate::common::ValidationError {
                field: "name".to_string(),
                message: "Name cannot be empty".to_string(),
            }]));
        }
        updates.push("name = ?");
        params.push(name.clone());
    }

    if let Some(email) = &payload.email {
        if !crate::common::looks_like_email(email) {
            return Err(ApiError::Validation(vec![crate::common::ValidationError {
                field: "email".to_string(),
                message: "Email is not a valid address".to_string(),
            }]));
        }
        updates.push("email = ?");
        params.push(email.clone());
    }

    if let Some(role) = &payload.role {
        if role != "user" && role != "admin" {
            return Err(ApiError::Validation(vec![crate::common::ValidationError {
                field: "role".to_string(),
                message: "Role must be 'user' or 'admin'".to_string(),
            }]));
        }
        updates.push("role = ?");
        params.push(role.clone());
    }

    if let Some(digest) = &new_digest {
        updates.push("password = ?");
        params.push(digest.clone());
    }

    if updates.is_empty() {
        return Err(ApiError::Validation(vec![crate::common::ValidationError {
            field: "body".to_string(),
            message: "No updatable fields provided".to_string(),
        }]));
    }

    updates.push("updated_at = datetime('now')");

    let sql = format!("UPDATE users SET {} WHERE id = ?", updates.join(", "));
    let mut query = sqlx::query(&sql);
    for param in &params {
        query = query.bind(param);
    }
    query = query.bind(&target.id);

    query.execute(&state.db).await.map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::Conflict("Email is already registered".to_string())
        } else {
            ApiError::DatabaseError(e)
        }
    })?;

    let updated = find_user_by_id(&state, &target.id)
        .await?
        .ok_or_else(|| ApiError::Internal("Failed to load updated account".to_string()))?;

    // Admin-on-other updates are tagged distinctly for the audit feed
    let action = if is_own_record {
        "update-user"
    } else {
        "admin-update-user"
    };
    let detail = if new_digest.is_some() {
        format!("Account {} updated (password changed)", target.id)
    } else {
        format!("Account {} updated", target.id)
    };
    state.activity.record(Some(&authed.id), action, &detail).await;

    info!(
        actor_id = %authed.id,
        target_id = %target.id,
        action = %action,
        "User profile updated"
    );

    let envelope = encrypt_profile(&state, &updated.envelope_profile())?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": envelope,
    })))
}

/// DELETE /api/auth/users/delete-user/:id - Admin-only hard delete
pub async fn delete_user(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&user_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    state
        .activity
        .record(
            Some(&authed.id),
            "delete-user",
            &format!("Account {} deleted", user_id),
        )
        .await;

    info!(
        admin_user_id = %authed.id,
        deleted_user_id = %user_id,
        "User deleted"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "User deleted successfully",
    })))
}

// ============================================================================
// Password reset
// ============================================================================

/// POST /api/auth/admins/forgot-password
/// Stores only the SHA-256 of a fresh random token; the raw value goes out
/// in the reset email and nowhere else
pub async fn forgot_password(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = find_user_by_email(&state, &payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No account with that email".to_string()))?;

    let mailer = match &state.mailer {
        Some(m) => m.clone(),
        None => {
            error!("Forgot-password requested but SMTP is not configured");
            return Err(ApiError::Internal(
                "Email delivery is not configured".to_string(),
            ));
        }
    };

    let mut raw = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut raw);
    let raw_token = hex::encode(raw);

    let token_hash = validators::hash_reset_token(&raw_token);
    let expires_at = (Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES)).to_rfc3339();

    // A newer request simply overwrites the previous token; only the most
    // recent one should remain valid
    sqlx::query("UPDATE users SET reset_token_hash = ?, reset_token_expires_at = ? WHERE id = ?")
        .bind(&token_hash)
        .bind(&expires_at)
        .bind(&user.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let reset_url = format!("{}/reset-password?token={}", state.client_url, raw_token);

    mailer
        .send_password_reset(&user.email, &user.name, &reset_url)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user.id, "Reset email delivery failed");
            ApiError::Internal("Failed to send reset email".to_string())
        })?;

    state
        .activity
        .record(Some(&user.id), "forgot-password", "Password reset requested")
        .await;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "Password reset token issued"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Password reset email sent",
    })))
}

/// POST /api/auth/admins/reset-password
/// Consumes a reset token: the password change and the token clearing
/// happen in the same UPDATE
pub async fn reset_password(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = validators::validate_reset(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let token_hash = validators::hash_reset_token(&payload.token);

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE reset_token_hash = ?")
        .bind(&token_hash)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Invalid or expired reset token".to_string()))?;

    // Expiry is checked at read time; an expired token just fails here and
    // lingers until the next forgot-password overwrites it
    if !validators::reset_token_still_valid(user.reset_token_expires_at.as_deref()) {
        warn!(user_id = %user.id, "Reset token expired");
        return Err(ApiError::NotFound("Invalid or expired reset token".to_string()));
    }

    let digest = password::hash_password(&payload.new_password).map_err(|e| {
        error!(error = %e, "Password hashing failed during reset");
        ApiError::Internal("Failed to reset password".to_string())
    })?;

    sqlx::query(
        "UPDATE users SET password = ?, reset_token_hash = NULL, reset_token_expires_at = NULL, updated_at = datetime('now') WHERE id = ?",
    )
    .bind(&digest)
    .bind(&user.id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    state
        .activity
        .record(Some(&user.id), "password-reset", "Password reset completed")
        .await;

    info!(user_id = %user.id, "Password reset completed");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Password has been reset",
    })))
}

// ============================================================================
// Guest access
// ============================================================================

/// GET /api/auth/users/guest-access
/// Always succeeds with a capability-limited, identity-less token
pub async fn guest_access(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let token = state
        .tokens
        .issue_guest()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!("Guest token issued");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Guest access granted",
        "token": token,
    })))
}

// ============================================================================
// Google OAuth bridge
// ============================================================================

fn map_google_error(e: GoogleError) -> ApiError {
    match e {
        GoogleError::NotConfigured => {
            ApiError::Internal("Google OAuth is not configured".to_string())
        }
        GoogleError::ExpiredToken => {
            ApiError::Unauthorized("expired or invalid id_token".to_string())
        }
        GoogleError::InvalidToken => {
            ApiError::Unauthorized("invalid or malformed id_token".to_string())
        }
        GoogleError::OAuthFailed(msg) => ApiError::Internal(msg),
        GoogleError::ServiceUnavailable => {
            ApiError::Internal("google token validation service unavailable".to_string())
        }
    }
}

/// Map a verified Google profile onto a local account.
///
/// First sight of an email provisions a passwordless `google` account; a
/// repeat sight with a different login-origin is rejected naming that
/// origin, so same-email accounts never silently merge.
async fn resolve_oauth_user(state: &AppState, profile: &GoogleProfile) -> Result<User, ApiError> {
    if let Some(existing) = find_user_by_email(state, &profile.email).await? {
        if existing.login_type != "google" {
            warn!(
                user_id = %existing.id,
                login_type = %existing.login_type,
                "OAuth login rejected: email registered under a different origin"
            );
            return Err(ApiError::Conflict(format!(
                "This email is already registered via {} login",
                existing.login_type
            )));
        }
        return Ok(existing);
    }

    let id = generate_user_id();
    let name = profile
        .name
        .clone()
        .unwrap_or_else(|| profile.email.split('@').next().unwrap_or("user").to_string());

    sqlx::query(
        "INSERT INTO users (id, name, email, password, role, login_type) VALUES (?, ?, ?, NULL, 'user', 'google')",
    )
    .bind(&id)
    .bind(&name)
    .bind(&profile.email)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    state
        .activity
        .record(Some(&id), "signup", "New account provisioned via Google OAuth")
        .await;

    info!(
        user_id = %id,
        email = %safe_email_log(&profile.email),
        provider = "google",
        "New user account created via Google OAuth"
    );

    find_user_by_id(state, &id)
        .await?
        .ok_or_else(|| ApiError::Internal("Failed to load created account".to_string()))
}

/// GET /api/auth/google - Start the Google OAuth handshake
pub async fn google_oauth_start(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();

    let auth_url = state.google.authorization_url().map_err(map_google_error)?;

    info!("Redirecting to Google OAuth consent page");
    Ok(Redirect::to(&auth_url))
}

/// GET /api/auth/google/callback
/// Completes the handshake and redirects the browser back to the client
/// with a URL-encoded cleartext JSON payload of profile + tokens.
///
/// This path deliberately bypasses the envelope codec - only local login
/// and update responses are encrypted.
pub async fn google_oauth_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();

    if let Some(oauth_error) = params.get("error") {
        warn!(oauth_error = %oauth_error, "Google OAuth returned an error");
        return Ok(client_error_redirect(&state, "Google sign-in was cancelled"));
    }

    let code = match params.get("code") {
        Some(code) => code,
        None => {
            warn!("OAuth callback missing authorization code");
            return Ok(client_error_redirect(&state, "Missing authorization code"));
        }
    };

    let token_response = match state.google.exchange_code(code).await {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Failed to exchange authorization code for tokens");
            return Ok(client_error_redirect(&state, "Google sign-in failed"));
        }
    };

    let id_token = match token_response.id_token {
        Some(t) => t,
        None => {
            error!("Google token response carried no id_token");
            return Ok(client_error_redirect(&state, "Google sign-in failed"));
        }
    };

    let profile = match state.google.verify_id_token(&id_token).await {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Google id_token verification failed");
            return Ok(client_error_redirect(&state, "Google sign-in failed"));
        }
    };

    let user = match resolve_oauth_user(&state, &profile).await {
        Ok(u) => u,
        Err(ApiError::Conflict(message)) => {
            return Ok(client_error_redirect(&state, &message));
        }
        Err(e) => return Err(e),
    };

    let access_token = state
        .tokens
        .issue_access(&user.id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let refresh_token = state
        .tokens
        .issue_refresh(&user.id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    state
        .activity
        .record(Some(&user.id), "login", "Signed in with Google")
        .await;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = "google",
        "User authentication successful via Google OAuth"
    );

    let payload = serde_json::json!({
        "user": user.envelope_profile(),
        "accessToken": access_token,
        "refreshToken": refresh_token,
    });
    let encoded = urlencoding::encode(&payload.to_string()).into_owned();

    Ok(Redirect::to(&format!(
        "{}/oauth/callback?payload={}",
        state.client_url, encoded
    )))
}

fn client_error_redirect(state: &AppState, message: &str) -> Redirect {
    let encoded = urlencoding::encode(message).into_owned();
    Redirect::to(&format!(
        "{}/oauth/callback?error={}",
        state.client_url, encoded
    ))
}

/// POST /api/auth/verify-token
/// Exchanges a Google ID token for a local session without the browser
/// redirect dance; same create-or-reject-by-origin rule as the callback
pub async fn verify_token(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<VerifyTokenRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let profile = state
        .google
        .verify_id_token(&payload.token)
        .await
        .map_err(map_google_error)?;

    let user = resolve_oauth_user(&state, &profile).await?;

    let access_token = state
        .tokens
        .issue_access(&user.id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let refresh_token = state
        .tokens
        .issue_refresh(&user.id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    state
        .activity
        .record(Some(&user.id), "login", "Signed in with Google")
        .await;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = "google",
        "Provider token exchanged for local session"
    );

    // OAuth responses stay cleartext; the envelope is a local-login shape
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Login successful",
        "accessToken": access_token,
        "refreshToken": refresh_token,
        "user": user.envelope_profile(),
    })))
}
