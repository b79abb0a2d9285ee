use axum::{
    extract::{Extension, Multipart, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use super::models::{CreateSongRequest, Song, UpdateSongRequest};
use super::validators;
use crate::auth::{AuthedUser, ReadAccess};
use crate::common::{
    generate_raw_id, generate_song_id, read_file_field, ApiError, AppState, MessageResponse,
    SearchParams, Validator,
};
use crate::services::media::sniff_content_type;

/// POST /api/songs/add-song - Create a song (admin).
/// media_type defaults to "audio" until media is uploaded
pub async fn add_song(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateSongRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let validation = request.validate(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let state = state_lock.read().await.clone();

    ensure_artist_exists(&state, &request.artist_id).await?;

    let song_id = generate_song_id();

    sqlx::query(
        "INSERT INTO songs (id, title, artist_id, album_id, genre_id, duration_secs, media_type) VALUES (?, ?, ?, ?, ?, ?, 'audio')",
    )
    .bind(&song_id)
    .bind(&request.title)
    .bind(&request.artist_id)
    .bind(&request.album_id)
    .bind(&request.genre_id)
    .bind(request.duration_secs)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let song = fetch_song(&state, &song_id).await?;

    state
        .activity
        .record(
            Some(&authed.id),
            "add-song",
            &format!("Song '{}' added", request.title),
        )
        .await;

    info!(song_id = %song_id, title = %request.title, "Song created");

    Ok((StatusCode::CREATED, Json(song)))
}

/// GET /api/songs/get-all-song - List songs, optional title search
pub async fn get_all_songs(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _access: ReadAccess,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Song>>, ApiError> {
    let state = state_lock.read().await.clone();

    let songs = match params.search.as_deref().filter(|s| !s.is_empty()) {
        Some(term) => {
            sqlx::query_as::<_, Song>("SELECT * FROM songs WHERE title LIKE ? ORDER BY title ASC")
                .bind(format!("%{}%", term))
                .fetch_all(&state.db)
                .await
        }
        None => {
            sqlx::query_as::<_, Song>("SELECT * FROM songs ORDER BY title ASC")
                .fetch_all(&state.db)
                .await
        }
    }
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(songs))
}

/// PUT /api/songs/update-song/:songId - Update song fields (admin)
pub async fn update_song(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(song_id): Path<String>,
    Json(request): Json<UpdateSongRequest>,
) -> Result<Json<Song>, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();
    fetch_song(&state, &song_id).await?;

    if let Some(artist_id) = &request.artist_id {
        ensure_artist_exists(&state, artist_id).await?;
    }

    let mut updates: Vec<&str> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(title) = &request.title {
        if title.trim().is_empty() {
            return Err(ApiError::Validation(vec![crate::common::ValidationError {
                field: "title".to_string(),
                message: "Song title cannot be empty".to_string(),
            }]));
        }
        updates.push("title = ?");
        params.push(title.clone());
    }

    if let Some(artist_id) = &request.artist_id {
        updates.push("artist_id = ?");
        params.push(artist_id.clone());
    }

    if let Some(album_id) = &request.album_id {
        updates.push("album_id = ?");
        params.push(album_id.clone());
    }

    if let Some(genre_id) = &request.genre_id {
        updates.push("genre_id = ?");
        params.push(genre_id.clone());
    }

    if let Some(duration) = request.duration_secs {
        if duration <= 0 {
            return Err(ApiError::Validation(vec![crate::common::ValidationError {
                field: "duration_secs".to_string(),
                message: "Duration must be positive".to_string(),
            }]));
        }
        updates.push("duration_secs = ?");
        params.push(duration.to_string());
    }

    if updates.is_empty() {
        return Err(ApiError::Validation(vec![crate::common::ValidationError {
            field: "body".to_string(),
            message: "No updatable fields provided".to_string(),
        }]));
    }

    updates.push("updated_at = datetime('now')");

    let sql = format!("UPDATE songs SET {} WHERE id = ?", updates.join(", "));
    let mut query = sqlx::query(&sql);
    for param in &params {
        query = query.bind(param);
    }
    query
        .bind(&song_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let song = fetch_song(&state, &song_id).await?;

    state
        .activity
        .record(
            Some(&authed.id),
            "update-song",
            &format!("Song '{}' updated", song.title),
        )
        .await;

    Ok(Json(song))
}

/// DELETE /api/songs/delete-song/:id - Delete a song (admin)
pub async fn delete_song(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(song_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM songs WHERE id = ?")
        .bind(&song_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Song not found".to_string()));
    }

    state
        .activity
        .record(
            Some(&authed.id),
            "delete-song",
            &format!("Song {} deleted", song_id),
        )
        .await;

    Ok(Json(MessageResponse {
        success: true,
        message: "Song deleted successfully".to_string(),
    }))
}

/// POST /api/songs/upload-media/:songId - Upload the song's media file
/// (admin). media_type is inferred from the file's sniffed mime type
pub async fn upload_song_media(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(song_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Song>, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();
    fetch_song(&state, &song_id).await?;

    let (file_data, declared_type, filename) = read_file_field(&mut multipart).await?;

    let mime_type = sniff_content_type(&file_data, declared_type.as_deref());
    let media_type = validators::media_type_for_mime(&mime_type).map_err(|msg| {
        ApiError::Validation(vec![crate::common::ValidationError {
            field: "file".to_string(),
            message: msg,
        }])
    })?;

    let extension = std::path::Path::new(&filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mp3");
    let key = format!("songs/{}_{}.{}", song_id, generate_raw_id(8), extension);

    let url = state
        .media
        .upload(file_data, &key, &mime_type)
        .await
        .map_err(|e| {
            error!(error = %e, song_id = %song_id, "Song media upload failed");
            ApiError::Internal("Failed to upload media".to_string())
        })?;

    sqlx::query(
        "UPDATE songs SET media_url = ?, media_type = ?, updated_at = datetime('now') WHERE id = ?",
    )
    .bind(&url)
    .bind(media_type)
    .bind(&song_id)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(
        song_id = %song_id,
        key = %key,
        media_type = %media_type,
        "Song media uploaded"
    );

    let song = fetch_song(&state, &song_id).await?;
    Ok(Json(song))
}

async fn fetch_song(state: &AppState, song_id: &str) -> Result<Song, ApiError> {
    sqlx::query_as::<_, Song>("SELECT * FROM songs WHERE id = ?")
        .bind(song_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Song not found".to_string()))
}

async fn ensure_artist_exists(state: &AppState, artist_id: &str) -> Result<(), ApiError> {
    let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM artists WHERE id = ?")
        .bind(artist_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    match exists {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound("Artist not found".to_string())),
    }
}
