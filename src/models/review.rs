use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub review_id: Uuid,
    pub movie_id: Uuid,
    pub user_id: i64,
    pub rating: i16,
    pub comment: String,
    pub contains_spoilers: bool,
    pub likes_count: i32,
    pub created_at: DateTime<Utc>,
}
