use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateArtistRequest {
    pub name: String,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateArtistRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
}
