//! Authentication data models

use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;

/// User database model
///
/// The password digest and reset-token fields never leave the server:
/// they are skipped on serialization, so a `User` can be returned from a
/// handler without leaking credentials.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub role: String,
    pub login_type: String,
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl User {
    /// Profile payload placed in the envelope on login and update
    pub fn envelope_profile(&self) -> serde_json::Value {
        json!({
            "_id": self.id,
            "name": self.name,
            "email": self.email,
            "role": self.role,
            "loginType": self.login_type,
        })
    }

    /// Profile payload placed in the envelope on signup - the freshly
    /// created record's id is not echoed back
    pub fn signup_profile(&self) -> serde_json::Value {
        json!({
            "name": self.name,
            "email": self.email,
            "role": self.role,
            "loginType": self.login_type,
        })
    }
}

/// POST /api/auth/users/signup request body
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

/// POST /api/auth/users/login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// PUT /api/auth/users/update-user/:userId request body
///
/// Which of these fields a caller may actually submit is decided by the
/// role permission table in `validators`, not by this shape.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

/// POST /api/auth/admins/forgot-password request body
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// POST /api/auth/admins/reset-password request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// POST /api/auth/verify-token request body (Google ID token exchange)
#[derive(Debug, Deserialize)]
pub struct VerifyTokenRequest {
    pub token: String,
}
