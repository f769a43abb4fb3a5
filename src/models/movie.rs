use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Document-side entity: descriptive metadata lives in the JSONB doc, the
// relational side only ever touches movie_id and title.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Movie {
    pub movie_id: Uuid,
    pub title: String,
    pub doc: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
