use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::services::booking::RefundOutcome;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/booking", post(create_booking))
        .route("/booking/bulk", post(create_booking_bulk))
        .route("/booking/confirm", post(confirm_booking))
        .route("/booking/confirm-all", post(confirm_all_bookings))
        .route("/booking/cancel", post(cancel_booking))
        .route("/admin/booking/refund", post(refund_booking))
        .route("/admin/bookings", get(list_all_bookings))
        .route("/transactions/{user_id}", get(transactions))
}

/* ---------- CREATE ---------- */

// POST /api/booking
//
// Legacy single-seat endpoint; the UI mostly uses /booking/bulk.
#[derive(Debug, Deserialize)]
struct CreateBookingRequest {
    user_id: i64,
    showtime_id: i64,
    seat_id: i64,
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookingRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.user_id <= 0 || req.showtime_id <= 0 || req.seat_id <= 0 {
        return Err(ApiError::bad_request(
            "user_id, showtime_id and seat_id must be > 0",
        ));
    }

    let created = state
        .booking
        .create_hold(req.user_id, req.showtime_id, &[req.seat_id])
        .await?;
    // Exactly one hold for a one-seat batch.
    let item = created
        .first()
        .ok_or_else(|| ApiError::internal("empty hold batch"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Booking pending",
            "book_id": item.book_id,
            "amount": item.amount,
        })),
    ))
}

// POST /api/booking/bulk
#[derive(Debug, Deserialize)]
struct BulkBookingRequest {
    user_id: i64,
    showtime_id: i64,
    seat_ids: Vec<i64>,
}

async fn create_booking_bulk(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BulkBookingRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.user_id <= 0 || req.showtime_id <= 0 {
        return Err(ApiError::bad_request("user_id and showtime_id must be > 0"));
    }
    if req.seat_ids.is_empty() {
        return Err(ApiError::bad_request("seat_ids[] must not be empty"));
    }

    let items = state
        .booking
        .create_hold(req.user_id, req.showtime_id, &req.seat_ids)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Bookings pending",
            "items": items,
        })),
    ))
}

/* ---------- CONFIRM / CANCEL ---------- */

#[derive(Debug, Deserialize)]
struct BookIdRequest {
    book_id: i64,
}

// POST /api/booking/confirm
async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookIdRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.book_id <= 0 {
        return Err(ApiError::bad_request("book_id must be > 0"));
    }

    state.booking.confirm_one(req.book_id).await?;
    Ok(Json(json!({ "message": "Payment confirmed" })))
}

#[derive(Debug, Deserialize)]
struct ConfirmAllRequest {
    user_id: i64,
}

// POST /api/booking/confirm-all
async fn confirm_all_bookings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConfirmAllRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.user_id <= 0 {
        return Err(ApiError::bad_request("user_id must be > 0"));
    }

    let confirmed = state.booking.confirm_all(req.user_id).await?;
    Ok(Json(json!({
        "message": "All payments confirmed",
        "confirmed": confirmed,
    })))
}

// POST /api/booking/cancel
async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookIdRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.book_id <= 0 {
        return Err(ApiError::bad_request("book_id must be > 0"));
    }

    state.booking.cancel_hold(req.book_id).await?;
    Ok(Json(json!({ "message": "Booking canceled" })))
}

/* ---------- ADMIN ---------- */

// POST /api/admin/booking/refund
async fn refund_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookIdRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.book_id <= 0 {
        return Err(ApiError::bad_request("book_id must be > 0"));
    }

    let response = match state.booking.refund(req.book_id).await? {
        RefundOutcome::Refunded { amount } => json!({
            "message": format!("Booking refunded {amount} and cancelled successfully"),
            "amount": amount,
        }),
        RefundOutcome::PendingCancelled => json!({
            "message": "Pending booking cancelled (no refund needed)",
        }),
    };
    Ok(Json(response))
}

// GET /api/admin/bookings
async fn list_all_bookings(
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let rows = state.booking.all_bookings().await?;
    Ok(Json(rows))
}

/* ---------- HISTORY ---------- */

// GET /api/transactions/{user_id}
async fn transactions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    if user_id <= 0 {
        return Err(ApiError::bad_request("user_id must be > 0"));
    }

    let rows = state.booking.transactions(user_id).await?;
    Ok(Json(rows))
}
