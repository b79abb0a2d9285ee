use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{CreateFaqRequest, Faq, UpdateFaqRequest};
use crate::auth::{AuthedUser, ReadAccess};
use crate::common::{generate_faq_id, ApiError, AppState, MessageResponse};

/// POST /api/faqs/add-faq - Create a FAQ entry (admin)
pub async fn add_faq(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateFaqRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let mut errors = Vec::new();
    if request.question.trim().is_empty() {
        errors.push(crate::common::ValidationError {
            field: "question".to_string(),
            message: "Question is required".to_string(),
        });
    }
    if request.answer.trim().is_empty() {
        errors.push(crate::common::ValidationError {
            field: "answer".to_string(),
            message: "Answer is required".to_string(),
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let state = state_lock.read().await.clone();
    let faq_id = generate_faq_id();

    sqlx::query("INSERT INTO faqs (id, question, answer) VALUES (?, ?, ?)")
        .bind(&faq_id)
        .bind(&request.question)
        .bind(&request.answer)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let faq = fetch_faq(&state, &faq_id).await?;

    Ok((StatusCode::CREATED, Json(faq)))
}

/// GET /api/faqs/get-all-faq - List FAQs (any valid token, incl. guest)
pub async fn get_all_faqs(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _access: ReadAccess,
) -> Result<Json<Vec<Faq>>, ApiError> {
    let state = state_lock.read().await.clone();

    let faqs = sqlx::query_as::<_, Faq>("SELECT * FROM faqs ORDER BY created_at ASC")
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    Ok(Json(faqs))
}

/// PUT /api/faqs/update-faq/:id - Update a FAQ entry (admin)
pub async fn update_faq(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(faq_id): Path<String>,
    Json(request): Json<UpdateFaqRequest>,
) -> Result<Json<Faq>, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();
    fetch_faq(&state, &faq_id).await?;

    let mut updates: Vec<&str> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(question) = &request.question {
        updates.push("question = ?");
        params.push(question.clone());
    }

    if let Some(answer) = &request.answer {
        updates.push("answer = ?");
        params.push(answer.clone());
    }

    if updates.is_empty() {
        return Err(ApiError::Validation(vec![crate::common::ValidationError {
            field: "body".to_string(),
            message: "No updatable fields provided".to_string(),
        }]));
    }

    updates.push("updated_at = datetime('now')");

    let sql = format!("UPDATE faqs SET {} WHERE id = ?", updates.join(", "));
    let mut query = sqlx::query(&sql);
    for param in &params {
        query = query.bind(param);
    }
    query
        .bind(&faq_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let faq = fetch_faq(&state, &faq_id).await?;
    Ok(Json(faq))
}

/// DELETE /api/faqs/delete-faq/:id - Delete a FAQ entry (admin)
pub async fn delete_faq(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(faq_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !authed.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM faqs WHERE id = ?")
        .bind(&faq_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("FAQ not found".to_string()));
    }

    Ok(Json(MessageResponse {
        success: true,
        message: "FAQ deleted successfully".to_string(),
    }))
}

async fn fetch_faq(state: &AppState, faq_id: &str) -> Result<Faq, ApiError> {
    sqlx::query_as::<_, Faq>("SELECT * FROM faqs WHERE id = ?")
        .bind(faq_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(|| ApiError::NotFound("FAQ not found".to_string()))
}
