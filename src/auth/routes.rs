//! Authentication routes

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/users/signup` - Create local account
/// - `POST /api/auth/users/login` - Authenticate, returns tokens + envelope
/// - `GET /api/auth/users/get-all-user` - List users (admin)
/// - `PUT /api/auth/users/update-user/:userId` - Update profile
/// - `DELETE /api/auth/users/delete-user/:id` - Delete user (admin)
/// - `GET /api/auth/users/guest-access` - Issue guest token
/// - `POST /api/auth/admins/forgot-password` - Issue reset email
/// - `POST /api/auth/admins/reset-password` - Consume reset token
/// - `GET /api/auth/google` - Begin OAuth handshake
/// - `GET /api/auth/google/callback` - Complete handshake, redirect with payload
/// - `POST /api/auth/verify-token` - Google ID token -> local session
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/users/signup", post(handlers::signup))
        .route("/api/auth/users/login", post(handlers::login))
        .route("/api/auth/users/get-all-user", get(handlers::get_all_users))
        .route(
            "/api/auth/users/update-user/:userId",
            put(handlers::update_user),
        )
        .route(
            "/api/auth/users/delete-user/:id",
            delete(handlers::delete_user),
        )
        .route("/api/auth/users/guest-access", get(handlers::guest_access))
        .route(
            "/api/auth/admins/forgot-password",
            post(handlers::forgot_password),
        )
        .route(
            "/api/auth/admins/reset-password",
            post(handlers::reset_password),
        )
        .route("/api/auth/google", get(handlers::google_oauth_start))
        .route(
            "/api/auth/google/callback",
            get(handlers::google_oauth_callback),
        )
        .route("/api/auth/verify-token", post(handlers::verify_token))
}
