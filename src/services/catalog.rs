//! Read-only catalog lookups used by the booking engine.
//!
//! These run on whatever executor the caller passes, so the engine can make
//! them inside its own transaction and have the reads covered by it.

use rust_decimal::Decimal;
use sqlx::PgExecutor;

pub async fn seat_price<'e, E>(exec: E, seat_id: i64) -> Result<Option<Decimal>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, Decimal>("SELECT price FROM seats WHERE seat_id = $1")
        .bind(seat_id)
        .fetch_optional(exec)
        .await
}

pub async fn showtime_exists<'e, E>(exec: E, showtime_id: i64) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM showtimes WHERE showtime_id = $1)",
    )
    .bind(showtime_id)
    .fetch_one(exec)
    .await
}
