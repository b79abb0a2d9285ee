use super::handlers;
use axum::{
    routing::{delete, get, post},
    Router,
};

/// Creates the favourites router
pub fn favourites_routes() -> Router {
    Router::new()
        .route(
            "/api/favourites/add-favourite",
            post(handlers::add_favourite),
        )
        .route(
            "/api/favourites/get-all-favourite",
            get(handlers::get_all_favourites),
        )
        .route(
            "/api/favourites/delete-favourite/:songId",
            delete(handlers::delete_favourite),
        )
}
