use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Favourite {
    pub id: String,
    pub user_id: String,
    pub song_id: String,
    pub created_at: Option<String>,
}

/// Favourite joined with its song for listing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FavouriteSong {
    pub favourite_id: String,
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub media_url: Option<String>,
    pub media_type: String,
    pub favourited_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddFavouriteRequest {
    pub song_id: String,
}
