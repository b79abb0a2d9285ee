//! Activity feed handlers

use axum::extract::Extension;
use axum::Json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use super::models::Activity;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

/// GET /api/activities/get-all-activity - Admin-only audit feed
pub async fn get_all_activity(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<Activity>>, ApiError> {
    if !authed.is_admin {
        warn!(
            user_id = %authed.id,
            "Activity feed access denied: admin privileges required"
        );
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let state = state_lock.read().await.clone();
    let activities = state.activity.list_all().await?;

    Ok(Json(activities))
}
