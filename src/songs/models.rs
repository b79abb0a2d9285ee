use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist_id: String,
    pub album_id: Option<String>,
    pub genre_id: Option<String>,
    pub duration_secs: Option<i64>,
    pub media_url: Option<String>,
    /// "audio" or "video"; set from the uploaded media's mime type,
    /// defaults to "audio" until media is uploaded
    pub media_type: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSongRequest {
    pub title: String,
    pub artist_id: String,
    pub album_id: Option<String>,
    pub genre_id: Option<String>,
    pub duration_secs: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSongRequest {
    pub title: Option<String>,
    pub artist_id: Option<String>,
    pub album_id: Option<String>,
    pub genre_id: Option<String>,
    pub duration_secs: Option<i64>,
}
