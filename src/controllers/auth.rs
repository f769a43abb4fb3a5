use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::models::User;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

// New users start with a small balance so they can pay later.
const STARTING_BALANCE: Decimal = Decimal::from_parts(100_000, 0, 0, false, 2);

#[derive(Debug, Deserialize)]
struct CredentialsRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    message: String,
    user_id: i64,
    balance: Decimal,
}

// POST /api/register
async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("email and password are required"));
    }

    if User::find_by_email(&req.email, &state.db).await?.is_some() {
        return Err(ApiError::conflict("email is already in use"));
    }

    let hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::internal(format!("failed to hash password: {e}")))?;

    let user_id: i64 = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, balance)
         VALUES ($1, $2, $3)
         RETURNING user_id",
    )
    .bind(&req.email)
    .bind(&hash)
    .bind(STARTING_BALANCE)
    .fetch_one(&state.db.pool)
    .await?;

    tracing::info!(user_id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Register success".to_string(),
            user_id,
            balance: STARTING_BALANCE,
        }),
    ))
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    user_id: i64,
    email: String,
    balance: Decimal,
}

// POST /api/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("email and password are required"));
    }

    let user = User::find_by_email(&req.email, &state.db)
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    if !user.verify_password(&req.password) {
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    Ok(Json(LoginResponse {
        user_id: user.user_id,
        email: user.email,
        balance: user.balance,
    }))
}
