use super::handlers;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Creates the artists router with all artist-related routes
pub fn artists_routes() -> Router {
    Router::new()
        .route("/api/artists/add-artist", post(handlers::add_artist))
        .route("/api/artists/get-all-artist", get(handlers::get_all_artists))
        .route("/api/artists/get-artist/:id", get(handlers::get_artist_by_id))
        .route(
            "/api/artists/update-artist/:artistId",
            put(handlers::update_artist),
        )
        .route(
            "/api/artists/delete-artist/:id",
            delete(handlers::delete_artist),
        )
        .route(
            "/api/artists/upload-image/:artistId",
            post(handlers::upload_artist_image),
        )
}
