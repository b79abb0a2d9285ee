use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{AddFavouriteRequest, Favourite, FavouriteSong};
use crate::auth::AuthedUser;
use crate::common::{generate_favourite_id, ApiError, AppState, MessageResponse};

/// POST /api/favourites/add-favourite - Favourite a song for the caller
pub async fn add_favourite(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<AddFavouriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let song: Option<(String,)> = sqlx::query_as("SELECT id FROM songs WHERE id = ?")
        .bind(&request.song_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;
    if song.is_none() {
        return Err(ApiError::NotFound("Song not found".to_string()));
    }

    let favourite_id = generate_favourite_id();

    sqlx::query("INSERT INTO favourites (id, user_id, song_id) VALUES (?, ?, ?)")
        .bind(&favourite_id)
        .bind(&authed.id)
        .bind(&request.song_id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                ApiError::Conflict("Song is already in your favourites".to_string())
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

    let favourite = sqlx::query_as::<_, Favourite>("SELECT * FROM favourites WHERE id = ?")
        .bind(&favourite_id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok((StatusCode::CREATED, Json(favourite)))
}

/// GET /api/favourites/get-all-favourite - The caller's favourites with
/// their songs
pub async fn get_all_favourites(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<FavouriteSong>>, ApiError> {
    let state = state_lock.read().await.clone();

    let favourites = sqlx::query_as::<_, FavouriteSong>(
        r#"
        SELECT f.id AS favourite_id, s.id AS song_id, s.title, s.artist_id,
               s.media_url, s.media_type, f.created_at AS favourited_at
        FROM favourites f
        JOIN songs s ON s.id = f.song_id
        WHERE f.user_id = ?
        ORDER BY f.created_at DESC
        "#,
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    Ok(Json(favourites))
}

/// DELETE /api/favourites/delete-favourite/:songId - Unfavourite a song
pub async fn delete_favourite(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(song_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM favourites WHERE user_id = ? AND song_id = ?")
        .bind(&authed.id)
        .bind(&song_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Song is not in your favourites".to_string()));
    }

    Ok(Json(MessageResponse {
        success: true,
        message: "Favourite removed".to_string(),
    }))
}
