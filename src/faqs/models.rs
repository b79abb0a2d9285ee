use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Faq {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFaqRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFaqRequest {
    pub question: Option<String>,
    pub answer: Option<String>,
}
