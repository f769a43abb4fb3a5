//! Error types and HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Typed failures from the booking engine. Every variant aborts the
/// surrounding transaction; partial writes never survive.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("user not found: {0}")]
    UserNotFound(i64),

    #[error("showtime not found: {0}")]
    ShowtimeNotFound(i64),

    #[error("seat not found: {0}")]
    SeatNotFound(i64),

    #[error("booking not found: {0}")]
    BookingNotFound(i64),

    #[error("payment not found for booking {0}")]
    PaymentNotFound(i64),

    #[error("seat already taken: {0}")]
    SeatUnavailable(i64),

    #[error("no pending payment")]
    NoPendingPayment,

    #[error("insufficient balance")]
    InsufficientBalance,

    #[error("only pending bookings can be cancelled")]
    CannotCancel,

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP error with a stable machine-readable code. Controllers build these
/// directly for request-shape problems; engine errors convert via `From`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    code: String,
    error: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_STATE", message)
    }

    pub fn insufficient_balance(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INSUFFICIENT_BALANCE", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "STORE", message)
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiErrorBody {
                code: self.code.to_string(),
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<BookingError> for ApiError {
    fn from(value: BookingError) -> Self {
        match value {
            BookingError::Validation(msg) => Self::bad_request(msg),
            BookingError::UserNotFound(_)
            | BookingError::ShowtimeNotFound(_)
            | BookingError::SeatNotFound(_)
            | BookingError::BookingNotFound(_)
            | BookingError::PaymentNotFound(_) => Self::not_found(value.to_string()),
            BookingError::SeatUnavailable(_) => Self::conflict(value.to_string()),
            BookingError::NoPendingPayment | BookingError::CannotCancel => {
                Self::invalid_state(value.to_string())
            }
            BookingError::InsufficientBalance => Self::insufficient_balance(value.to_string()),
            BookingError::Store(e) => {
                tracing::error!("store error: {:?}", e);
                Self::internal("database error")
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(value: sqlx::Error) -> Self {
        Self::from(BookingError::Store(value))
    }
}
