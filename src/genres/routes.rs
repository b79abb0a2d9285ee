use super::handlers;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Creates the genres router
pub fn genres_routes() -> Router {
    Router::new()
        .route("/api/genres/add-genre", post(handlers::add_genre))
        .route("/api/genres/get-all-genre", get(handlers::get_all_genres))
        .route("/api/genres/update-genre/:id", put(handlers::update_genre))
        .route(
            "/api/genres/delete-genre/:id",
            delete(handlers::delete_genre),
        )
}
