use super::handlers;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Creates the playlists router
pub fn playlists_routes() -> Router {
    Router::new()
        .route("/api/playlists/add-playlist", post(handlers::add_playlist))
        .route(
            "/api/playlists/get-all-playlist",
            get(handlers::get_all_playlists),
        )
        .route(
            "/api/playlists/get-songs/:id",
            get(handlers::get_playlist_songs),
        )
        .route(
            "/api/playlists/update-playlist/:id",
            put(handlers::update_playlist),
        )
        .route(
            "/api/playlists/delete-playlist/:id",
            delete(handlers::delete_playlist),
        )
        .route(
            "/api/playlists/add-song/:id",
            post(handlers::add_song_to_playlist),
        )
        .route(
            "/api/playlists/remove-song/:id/:songId",
            delete(handlers::remove_song_from_playlist),
        )
}
