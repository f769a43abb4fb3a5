use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Showtime {
    pub showtime_id: i64,
    pub movie_id: Uuid,
    pub theater_id: Option<Uuid>,
    pub showtime: DateTime<Utc>,
}
