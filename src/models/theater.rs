use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Theater {
    pub theater_id: Uuid,
    pub branch_name: String,
    pub doc: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
