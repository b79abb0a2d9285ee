use super::handlers;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Creates the albums router
pub fn albums_routes() -> Router {
    Router::new()
        .route("/api/albums/add-album", post(handlers::add_album))
        .route("/api/albums/get-all-album", get(handlers::get_all_albums))
        .route(
            "/api/albums/update-album/:albumId",
            put(handlers::update_album),
        )
        .route(
            "/api/albums/delete-album/:id",
            delete(handlers::delete_album),
        )
        .route(
            "/api/albums/upload-cover/:albumId",
            post(handlers::upload_album_cover),
        )
}
