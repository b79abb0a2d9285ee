// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::activity::ActivityService;
use crate::services::{GoogleOAuthService, Mailer, MediaService, SymmetricCodec, TokenIssuer};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Base URL of the admin frontend, used for OAuth redirects and reset links
    pub client_url: String,
    pub codec: Arc<SymmetricCodec>,
    pub tokens: Arc<TokenIssuer>,
    /// Absent when SMTP is not configured; forgot-password then fails as Internal
    pub mailer: Option<Arc<Mailer>>,
    pub media: Arc<MediaService>,
    pub google: Arc<GoogleOAuthService>,
    pub activity: Arc<ActivityService>,
}
