// src/main.rs
use axum::{extract::Extension, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod activity;
mod albums;
mod artists;
mod auth;
mod common;
mod faqs;
mod favourites;
mod genres;
mod playlists;
mod services;
mod songs;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use activity::ActivityService;
use common::AppState;
use services::{GoogleOAuthService, Mailer, MediaService, SymmetricCodec, TokenIssuer};

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://melody.db".to_string());
    let jwt_secret =
        env::var("JWT_SECRET").unwrap_or_else(|_| "replace_with_strong_secret".to_string());
    let client_url =
        env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    // Run database migrations
    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder().no_proxy().build()?;

    // Process-lifetime envelope key: an ENVELOPE_KEY hex override allows
    // per-deployment rotation; otherwise a fresh key is generated at start
    let envelope_key = match env::var("ENVELOPE_KEY") {
        Ok(hex_key) => {
            let decoded: [u8; 32] = hex::decode(&hex_key)
                .ok()
                .and_then(|bytes| bytes.try_into().ok())
                .ok_or_else(|| anyhow::anyhow!("ENVELOPE_KEY must be 64 hex characters"))?;
            info!("Envelope key loaded from environment");
            decoded
        }
        Err(_) => {
            info!("Envelope key generated for this process lifetime");
            SymmetricCodec::generate_key()
        }
    };
    let codec = Arc::new(SymmetricCodec::new(envelope_key));

    let tokens = Arc::new(TokenIssuer::new(jwt_secret));
    info!("TokenIssuer initialized");

    let mailer = match Mailer::from_env() {
        Ok(Some(m)) => Some(Arc::new(m)),
        Ok(None) => {
            warn!("SMTP not configured; password reset emails are disabled");
            None
        }
        Err(e) => {
            warn!(error = %e, "SMTP configuration invalid; password reset emails are disabled");
            None
        }
    };

    let media = Arc::new(MediaService::from_env());
    info!("MediaService initialized");

    let google = Arc::new(GoogleOAuthService::from_env(http_client));
    info!("GoogleOAuthService initialized");

    let activity_service = Arc::new(ActivityService::new(pool.clone()));
    info!("ActivityService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        db: pool,
        client_url,
        codec,
        tokens,
        mailer,
        media,
        google,
        activity: activity_service,
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(auth::auth_routes())
        .merge(artists::artists_routes())
        .merge(albums::albums_routes())
        .merge(songs::songs_routes())
        .merge(genres::genres_routes())
        .merge(playlists::playlists_routes())
        .merge(favourites::favourites_routes())
        .merge(faqs::faqs_routes())
        .merge(activity::activity_routes())
        .layer(Extension(shared.clone()))
        .layer({
            // Get CORS origins from environment variable
            let cors_origins = env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
