use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Static catalog row, immutable after seeding.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Seat {
    pub seat_id: i64,
    pub seat: String,
    pub price: Decimal,
}
