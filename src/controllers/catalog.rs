use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/showtimes", get(get_showtimes))
        .route("/seats", get(get_seats))
}

/* ---------- SHOWTIMES ---------- */

#[derive(Debug, Deserialize)]
struct ShowtimesQuery {
    movie_id: Uuid,
}

#[derive(Debug, FromRow, Serialize)]
struct ShowtimeResponse {
    showtime_id: i64,
    showtime: DateTime<Utc>,
}

// GET /api/showtimes?movie_id=<uuid>
async fn get_showtimes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ShowtimesQuery>,
) -> ApiResult<impl IntoResponse> {
    let rows = sqlx::query_as::<_, ShowtimeResponse>(
        "SELECT showtime_id, showtime
         FROM showtimes
         WHERE movie_id = $1
         ORDER BY showtime",
    )
    .bind(params.movie_id)
    .fetch_all(&state.db.pool)
    .await?;

    Ok(Json(rows))
}

/* ---------- SEATS ---------- */

#[derive(Debug, Deserialize)]
struct SeatsQuery {
    showtime_id: i64,
}

#[derive(Debug, FromRow, Serialize)]
struct SeatAvailability {
    seat_id: i64,
    seat: String,
    price: Decimal,
    available: bool,
}

// GET /api/seats?showtime_id=N
//
// Every catalog seat, with availability derived from book_seat row absence
// for the requested showtime.
async fn get_seats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SeatsQuery>,
) -> ApiResult<impl IntoResponse> {
    if params.showtime_id <= 0 {
        return Err(ApiError::bad_request("showtime_id must be > 0"));
    }

    let rows = sqlx::query_as::<_, SeatAvailability>(
        "SELECT s.seat_id,
                s.seat,
                s.price,
                (bs.seat_id IS NULL) AS available
         FROM seats s
         LEFT JOIN book_seat bs
                ON bs.seat_id = s.seat_id AND bs.showtime_id = $1
         ORDER BY s.seat_id",
    )
    .bind(params.showtime_id)
    .fetch_all(&state.db.pool)
    .await?;

    Ok(Json(rows))
}
