use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::{CreatePlaylistRequest, Playlist, PlaylistSongRequest, UpdatePlaylistRequest};
use crate::auth::AuthedUser;
use crate::common::{generate_playlist_id, ApiError, AppState, MessageResponse};
use crate::songs::models::Song;

/// POST /api/playlists/add-playlist - Create a playlist owned by the caller
pub async fn add_playlist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreatePlaylistRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::Validation(vec![crate::common::ValidationError {
            field: "name".to_string(),
            message: "Playlist name is required".to_string(),
        }]));
    }

    let state = state_lock.read().await.clone();
    let playlist_id = generate_playlist_id();

    sqlx::query("INSERT INTO playlists (id, name, user_id) VALUES (?, ?, ?)")
        .bind(&playlist_id)
        .bind(&request.name)
        .bind(&authed.id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let playlist = fetch_playlist(&state, &playlist_id).await?;

    info!(
        playlist_id = %playlist_id,
        user_id = %authed.id,
        "Playlist created"
    );

    Ok((StatusCode::CREATED, Json(playlist)))
}

/// GET /api/playlists/get-all-playlist - List the caller's playlists
pub async fn get_all_playlists(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<Playlist>>, ApiError> {
    let state = state_lock.read().await.clone();

    let playlists = sqlx::query_as::<_, Playlist>(
        "SELECT * FROM playlists WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(playlists))
}

/// GET /api/playlists/get-songs/:id - List songs in one of the caller's
/// playlists
pub async fn get_playlist_songs(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(playlist_id): Path<String>,
) -> Result<Json<Vec<Song>>, ApiError> {
    let state = state_lock.read().await.clone();
    let playlist = fetch_playlist(&state, &playlist_id).await?;
    ensure_owner(&playlist, &authed)?;

    let songs = sqlx::query_as::<_, Song>(
        r#"
        SELECT s.* FROM songs s
        JOIN playlist_songs ps ON ps.song_id = s.id
        WHERE ps.playlist_id = ?
        ORDER BY ps.added_at ASC
        "#,
    )
    .bind(&playlist_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(songs))
}

/// PUT /api/playlists/update-playlist/:id - Rename an owned playlist
pub async fn update_playlist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(playlist_id): Path<String>,
    Json(request): Json<UpdatePlaylistRequest>,
) -> Result<Json<Playlist>, ApiError> {
    if request.name.trim().is_empty() {
        return Err(ApiError::Validation(vec![crate::common::ValidationError {
            field: "name".to_string(),
            message: "Playlist name is required".to_string(),
        }]));
    }

    let state = state_lock.read().await.clone();
    let playlist = fetch_playlist(&state, &playlist_id).await?;
    ensure_owner(&playlist, &authed)?;

    sqlx::query("UPDATE playlists SET name = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(&request.name)
        .bind(&playlist_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let playlist = fetch_playlist(&state, &playlist_id).await?;
    Ok(Json(playlist))
}

/// DELETE /api/playlists/delete-playlist/:id - Delete an owned playlist
pub async fn delete_playlist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(playlist_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let playlist = fetch_playlist(&state, &playlist_id).await?;
    ensure_owner(&playlist, &authed)?;

    sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(&playlist_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Playlist deleted successfully".to_string(),
    }))
}

/// POST /api/playlists/add-song/:id - Add a song to an owned playlist
pub async fn add_song_to_playlist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(playlist_id): Path<String>,
    Json(request): Json<PlaylistSongRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let playlist = fetch_playlist(&state, &playlist_id).await?;
    ensure_owner(&playlist, &authed)?;

    let song: Option<(String,)> = sqlx::query_as("SELECT id FROM songs WHERE id = ?")
        .bind(&request.song_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;
    if song.is_none() {
        return Err(ApiError::NotFound("Song not found".to_string()));
    }

    sqlx::query("INSERT INTO playlist_songs (playlist_id, song_id) VALUES (?, ?)")
        .bind(&playlist_id)
        .bind(&request.song_id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed")
                || e.to_string().contains("PRIMARY KEY constraint failed")
            {
                ApiError::Conflict("Song is already in this playlist".to_string())
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Song added to playlist".to_string(),
    }))
}

/// DELETE /api/playlists/remove-song/:id/:songId - Remove a song from an
/// owned playlist
pub async fn remove_song_from_playlist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path((playlist_id, song_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();
    let playlist = fetch_playlist(&state, &playlist_id).await?;
    ensure_owner(&playlist, &authed)?;

    let result = sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
        .bind(&playlist_id)
        .bind(&song_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Song is not in this playlist".to_string()));
    }

    Ok(Json(MessageResponse {
        success: true,
        message: "Song removed from playlist".to_string(),
    }))
}

async fn fetch_playlist(state: &AppState, playlist_id: &str) -> Result<Playlist, ApiError> {
    sqlx::query_as::<_, Playlist>("SELECT * FROM playlists WHERE id = ?")
        .bind(playlist_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Playlist not found".to_string()))
}

/// Playlists are private to their owner; admins may manage any
fn ensure_owner(playlist: &Playlist, authed: &AuthedUser) -> Result<(), ApiError> {
    if playlist.user_id != authed.id && !authed.is_admin {
        return Err(ApiError::Forbidden(
            "You may only manage your own playlists".to_string(),
        ));
    }
    Ok(())
}
