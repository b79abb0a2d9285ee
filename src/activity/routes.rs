//! Activity feed routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the activity feed router
///
/// # Routes
/// - `GET /api/activities/get-all-activity` - Admin audit feed
pub fn activity_routes() -> Router {
    Router::new().route(
        "/api/activities/get-all-activity",
        get(handlers::get_all_activity),
    )
}
