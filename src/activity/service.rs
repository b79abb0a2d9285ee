use sqlx::SqlitePool;
use tracing::warn;

use super::models::Activity;
use crate::common::{generate_activity_id, ApiError};

/// Records and lists audit entries.
///
/// Recording is fire-and-forget: an insert failure is logged and swallowed
/// so the triggering request never fails on its audit trail.
#[derive(Debug, Clone)]
pub struct ActivityService {
    db: SqlitePool,
}

impl ActivityService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Record an audit entry attributed to `actor` (None for system events)
    pub async fn record(&self, actor: Option<&str>, action: &str, detail: &str) {
        let id = generate_activity_id();

        let result = sqlx::query(
            "INSERT INTO activities (id, user_id, action, detail) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(actor)
        .bind(action)
        .bind(detail)
        .execute(&self.db)
        .await;

        if let Err(e) = result {
            warn!(
                error = %e,
                action = %action,
                "Failed to record activity entry"
            );
        }
    }

    /// All entries, newest first
    pub async fn list_all(&self) -> Result<Vec<Activity>, ApiError> {
        sqlx::query_as::<_, Activity>(
            "SELECT id, user_id, action, detail, created_at FROM activities ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }
}
