use axum::{
    extract::{Extension, Multipart, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use super::models::{Artist, CreateArtistRequest, UpdateArtistRequest};
use super::validators;
use crate::auth::{AuthedUser, ReadAccess};
use crate::common::{
    generate_artist_id, generate_raw_id, read_file_field, ApiError, AppState, MessageResponse,
    SearchParams, Validator,
};
use crate::services::media::sniff_content_type;

/// POST /api/artists/add-artist - Create a new artist (admin)
pub async fn add_artist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateArtistRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let validation = request.validate(&request);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let state = state_lock.read().await.clone();
    let artist_id = generate_artist_id();

    sqlx::query("INSERT INTO artists (id, name, bio) VALUES (?, ?, ?)")
        .bind(&artist_id)
        .bind(&request.name)
        .bind(&request.bio)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let artist = fetch_artist(&state, &artist_id).await?;

    state
        .activity
        .record(
            Some(&authed.id),
            "add-artist",
            &format!("Artist '{}' added", request.name),
        )
        .await;

    info!(artist_id = %artist_id, name = %request.name, "Artist created");

    Ok((StatusCode::CREATED, Json(artist)))
}

/// GET /api/artists/get-all-artist - List artists, optionally filtered
/// by a name substring (any valid token, including guest)
pub async fn get_all_artists(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _access: ReadAccess,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Artist>>, ApiError> {
    let state = state_lock.read().await.clone();

    let artists = match params.search.as_deref().filter(|s| !s.is_empty()) {
        Some(term) => {
            sqlx::query_as::<_, Artist>(
                "SELECT * FROM artists WHERE name LIKE ? ORDER BY name ASC",
            )
            .bind(format!("%{}%", term))
            .fetch_all(&state.db)
            .await
        }
        None => {
            sqlx::query_as::<_, Artist>("SELECT * FROM artists ORDER BY name ASC")
                .fetch_all(&state.db)
                .await
        }
    }
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(artists))
}

/// GET /api/artists/get-artist/:id - Fetch one artist
pub async fn get_artist_by_id(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _access: ReadAccess,
    Path(artist_id): Path<String>,
) -> Result<Json<Artist>, ApiError> {
    let state = state_lock.read().await.clone();
    let artist = fetch_artist(&state, &artist_id).await?;
    Ok(Json(artist))
}

/// PUT /api/artists/update-artist/:artistId - Update artist fields (admin)
pub async fn update_artist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(artist_id): Path<String>,
    Json(request): Json<UpdateArtistRequest>,
) -> Result<Json<Artist>, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();
    fetch_artist(&state, &artist_id).await?;

    let mut updates: Vec<&str> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation(vec![crate::common::ValidationError {
                field: "name".to_string(),
                message: "Artist name cannot be empty".to_string(),
            }]));
        }
        updates.push("name = ?");
        params.push(name.clone());
    }

    if let Some(bio) = &request.bio {
        updates.push("bio = ?");
        params.push(bio.clone());
    }

    if updates.is_empty() {
        return Err(ApiError::Validation(vec![crate::common::ValidationError {
            field: "body".to_string(),
            message: "No updatable fields provided".to_string(),
        }]));
    }

    updates.push("updated_at = datetime('now')");

    let sql = format!("UPDATE artists SET {} WHERE id = ?", updates.join(", "));
    let mut query = sqlx::query(&sql);
    for param in &params {
        query = query.bind(param);
    }
    query
        .bind(&artist_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let artist = fetch_artist(&state, &artist_id).await?;

    // Attributed to the authenticated caller, same as every sibling handler
    state
        .activity
        .record(
            Some(&authed.id),
            "update-artist",
            &format!("Artist '{}' updated", artist.name),
        )
        .await;

    info!(artist_id = %artist_id, "Artist updated");

    Ok(Json(artist))
}

/// DELETE /api/artists/delete-artist/:id - Delete an artist (admin);
/// albums and songs cascade
pub async fn delete_artist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(artist_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM artists WHERE id = ?")
        .bind(&artist_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Artist not found".to_string()));
    }

    state
        .activity
        .record(
            Some(&authed.id),
            "delete-artist",
            &format!("Artist {} deleted", artist_id),
        )
        .await;

    info!(artist_id = %artist_id, "Artist deleted");

    Ok(Json(MessageResponse {
        success: true,
        message: "Artist deleted successfully".to_string(),
    }))
}

/// POST /api/artists/upload-image/:artistId - Upload an artist image to
/// the media store and attach its URL (admin, multipart)
pub async fn upload_artist_image(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(artist_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Artist>, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();
    fetch_artist(&state, &artist_id).await?;

    let (file_data, declared_type, filename) = read_file_field(&mut multipart).await?;

    let mime_type = sniff_content_type(&file_data, declared_type.as_deref());
    validators::validate_image_mime_type(&mime_type)
        .map_err(|msg| ApiError::Validation(vec![crate::common::ValidationError {
            field: "file".to_string(),
            message: msg,
        }]))?;

    let extension = std::path::Path::new(&filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("jpg");
    let key = format!("artists/{}_{}.{}", artist_id, generate_raw_id(8), extension);

    let url = state
        .media
        .upload(file_data, &key, &mime_type)
        .await
        .map_err(|e| {
            error!(error = %e, artist_id = %artist_id, "Artist image upload failed");
            ApiError::Internal("Failed to upload image".to_string())
        })?;

    sqlx::query("UPDATE artists SET image_url = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(&url)
        .bind(&artist_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    info!(artist_id = %artist_id, key = %key, "Artist image uploaded");

    let artist = fetch_artist(&state, &artist_id).await?;
    Ok(Json(artist))
}

async fn fetch_artist(state: &AppState, artist_id: &str) -> Result<Artist, ApiError> {
    sqlx::query_as::<_, Artist>("SELECT * FROM artists WHERE id = ?")
        .bind(artist_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Artist not found".to_string()))
}
