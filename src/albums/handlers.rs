use axum::{
    extract::{Extension, Multipart, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use super::models::{Album, CreateAlbumRequest, UpdateAlbumRequest};
use crate::auth::{AuthedUser, ReadAccess};
use crate::common::{
    generate_album_id, generate_raw_id, read_file_field, ApiError, AppState, MessageResponse,
    SearchParams, Validator,
};
use crate::services::media::sniff_content_type;

/// POST /api/albums/add-album - Create an album (admin)
pub async fn add_album(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateAlbumRequest>,
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

    let album_id = generate_album_id();

    sqlx::query(
        "INSERT INTO albums (id, title, artist_id, genre_id, release_year) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&album_id)
    .bind(&request.title)
    .bind(&request.artist_id)
    .bind(&request.genre_id)
    .bind(request.release_year)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    let album = fetch_album(&state, &album_id).await?;

    state
        .activity
        .record(
            Some(&authed.id),
            "add-album",
            &format!("Album '{}' added", request.title),
        )
        .await;

    info!(album_id = %album_id, title = %request.title, "Album created");

    Ok((StatusCode::CREATED, Json(album)))
}

/// GET /api/albums/get-all-album - List albums, optional title search
pub async fn get_all_albums(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _access: ReadAccess,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Album>>, ApiError> {
    let state = state_lock.read().await.clone();

    let albums = match params.search.as_deref().filter(|s| !s.is_empty()) {
        Some(term) => {
            sqlx::query_as::<_, Album>("SELECT * FROM albums WHERE title LIKE ? ORDER BY title ASC")
                .bind(format!("%{}%", term))
                .fetch_all(&state.db)
                .await
        }
        None => {
            sqlx::query_as::<_, Album>("SELECT * FROM albums ORDER BY title ASC")
                .fetch_all(&state.db)
                .await
        }
    }
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(albums))
}

/// PUT /api/albums/update-album/:albumId - Update album fields (admin)
pub async fn update_album(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(album_id): Path<String>,
    Json(request): Json<UpdateAlbumRequest>,
) -> Result<Json<Album>, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();
    fetch_album(&state, &album_id).await?;

    if let Some(artist_id) = &request.artist_id {
        ensure_artist_exists(&state, artist_id).await?;
    }

    let mut updates: Vec<&str> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(title) = &request.title {
        if title.trim().is_empty() {
            return Err(ApiError::Validation(vec![crate::common::ValidationError {
                field: "title".to_string(),
                message: "Album title cannot be empty".to_string(),
            }]));
        }
        updates.push("title = ?");
        params.push(title.clone());
    }

    if let Some(artist_id) = &request.artist_id {
        updates.push("artist_id = ?");
        params.push(artist_id.clone());
    }

    if let Some(genre_id) = &request.genre_id {
        updates.push("genre_id = ?");
        params.push(genre_id.clone());
    }

    if let Some(year) = request.release_year {
        updates.push("release_year = ?");
        params.push(year.to_string());
    }

    if updates.is_empty() {
        return Err(ApiError::Validation(vec![crate::common::ValidationError {
            field: "body".to_string(),
            message: "No updatable fields provided".to_string(),
        }]));
    }

    updates.push("updated_at = datetime('now')");

    let sql = format!("UPDATE albums SET {} WHERE id = ?", updates.join(", "));
    let mut query = sqlx::query(&sql);
    for param in &params {
        query = query.bind(param);
    }
    query
        .bind(&album_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let album = fetch_album(&state, &album_id).await?;

    state
        .activity
        .record(
            Some(&authed.id),
            "update-album",
            &format!("Album '{}' updated", album.title),
        )
        .await;

    Ok(Json(album))
}

/// DELETE /api/albums/delete-album/:id - Delete an album (admin)
pub async fn delete_album(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(album_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM albums WHERE id = ?")
        .bind(&album_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Album not found".to_string()));
    }

    state
        .activity
        .record(
            Some(&authed.id),
            "delete-album",
            &format!("Album {} deleted", album_id),
        )
        .await;

    Ok(Json(MessageResponse {
        success: true,
        message: "Album deleted successfully".to_string(),
    }))
}

/// POST /api/albums/upload-cover/:albumId - Upload album cover art (admin)
pub async fn upload_album_cover(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(album_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Album>, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();
    fetch_album(&state, &album_id).await?;

    let (file_data, declared_type, filename) = read_file_field(&mut multipart).await?;

    let mime_type = sniff_content_type(&file_data, declared_type.as_deref());
    if !mime_type.starts_with("image/") {
        return Err(ApiError::Validation(vec![crate::common::ValidationError {
            field: "file".to_string(),
            message: "Only image files are allowed".to_string(),
        }]));
    }

    let extension = std::path::Path::new(&filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("jpg");
    let key = format!("albums/{}_{}.{}", album_id, generate_raw_id(8), extension);

    let url = state
        .media
        .upload(file_data, &key, &mime_type)
        .await
        .map_err(|e| {
            error!(error = %e, album_id = %album_id, "Album cover upload failed");
            ApiError::Internal("Failed to upload cover".to_string())
        })?;

    sqlx::query("UPDATE albums SET cover_url = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(&url)
        .bind(&album_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(album_id = %album_id, key = %key, "Album cover uploaded");

    let album = fetch_album(&state, &album_id).await?;
    Ok(Json(album))
}

async fn fetch_album(state: &AppState, album_id: &str) -> Result<Album, ApiError> {
    sqlx::query_as::<_, Album>("SELECT * FROM albums WHERE id = ?")
        .bind(album_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Album not found".to_string()))
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
