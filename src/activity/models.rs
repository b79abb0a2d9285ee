//! Activity feed data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Immutable audit record of a significant account or catalog action
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: String,
    /// Acting user; None for system-originated events
    pub user_id: Option<String>,
    /// Short action tag, e.g. "login", "signup", "admin-update-user"
    pub action: String,
    pub detail: String,
    pub created_at: Option<String>,
}
