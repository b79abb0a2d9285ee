use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::{CreateGenreRequest, Genre, UpdateGenreRequest};
use crate::auth::{AuthedUser, ReadAccess};
use crate::common::{generate_genre_id, ApiError, AppState, MessageResponse};

/// POST /api/genres/add-genre - Create a genre (admin)
pub async fn add_genre(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateGenreRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    if request.name.trim().is_empty() {
        return Err(ApiError::Validation(vec![crate::common::ValidationError {
            field: "name".to_string(),
            message: "Genre name is required".to_string(),
        }]));
    }

    let state = state_lock.read().await.clone();
    let genre_id = generate_genre_id();

    sqlx::query("INSERT INTO genres (id, name, description) VALUES (?, ?, ?)")
        .bind(&genre_id)
        .bind(&request.name)
        .bind(&request.description)
        .execute(&state.db)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                ApiError::Conflict("Genre name already exists".to_string())
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

    let genre = fetch_genre(&state, &genre_id).await?;

    info!(genre_id = %genre_id, name = %request.name, "Genre created");

    Ok((StatusCode::CREATED, Json(genre)))
}

/// GET /api/genres/get-all-genre - List genres (any valid token)
pub async fn get_all_genres(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _access: ReadAccess,
) -> Result<Json<Vec<Genre>>, ApiError> {
    let state = state_lock.read().await.clone();

    let genres = sqlx::query_as::<_, Genre>("SELECT * FROM genres ORDER BY name ASC")
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(genres))
}

/// PUT /api/genres/update-genre/:id - Update a genre (admin)
pub async fn update_genre(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(genre_id): Path<String>,
    Json(request): Json<UpdateGenreRequest>,
) -> Result<Json<Genre>, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();
    fetch_genre(&state, &genre_id).await?;

    let mut updates: Vec<&str> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation(vec![crate::common::ValidationError {
                field: "name".to_string(),
                message: "Genre name cannot be empty".to_string(),
            }]));
        }
        updates.push("name = ?");
        params.push(name.clone());
    }

    if let Some(description) = &request.description {
        updates.push("description = ?");
        params.push(description.clone());
    }

    if updates.is_empty() {
        return Err(ApiError::Validation(vec![crate::common::ValidationError {
            field: "body".to_string(),
            message: "No updatable fields provided".to_string(),
        }]));
    }

    let sql = format!("UPDATE genres SET {} WHERE id = ?", updates.join(", "));
    let mut query = sqlx::query(&sql);
    for param in &params {
        query = query.bind(param);
    }
    query
        .bind(&genre_id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                ApiError::Conflict("Genre name already exists".to_string())
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

    let genre = fetch_genre(&state, &genre_id).await?;
    Ok(Json(genre))
}

/// DELETE /api/genres/delete-genre/:id - Delete a genre (admin)
pub async fn delete_genre(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(genre_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM genres WHERE id = ?")
        .bind(&genre_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Genre not found".to_string()));
    }

    Ok(Json(MessageResponse {
        success: true,
        message: "Genre deleted successfully".to_string(),
    }))
}

async fn fetch_genre(state: &AppState, genre_id: &str) -> Result<Genre, ApiError> {
    sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE id = ?")
        .bind(genre_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("Genre not found".to_string()))
}
