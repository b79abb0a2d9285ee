use super::handlers;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Creates the songs router
pub fn songs_routes() -> Router {
    Router::new()
        .route("/api/songs/add-song", post(handlers::add_song))
        .route("/api/songs/get-all-song", get(handlers::get_all_songs))
        .route("/api/songs/update-song/:songId", put(handlers::update_song))
        .route("/api/songs/delete-song/:id", delete(handlers::delete_song))
        .route(
            "/api/songs/upload-media/:songId",
            post(handlers::upload_song_media),
        )
}
