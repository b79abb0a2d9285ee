use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub artist_id: String,
    pub genre_id: Option<String>,
    pub cover_url: Option<String>,
    pub release_year: Option<i32>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAlbumRequest {
    pub title: String,
    pub artist_id: String,
    pub genre_id: Option<String>,
    pub release_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAlbumRequest {
    pub title: Option<String>,
    pub artist_id: Option<String>,
    pub genre_id: Option<String>,
    pub release_year: Option<i32>,
}
