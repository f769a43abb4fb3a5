//! Document-side routes: movie metadata, theater profiles, user profiles and
//! reviews. Descriptive data lives in JSONB docs keyed by opaque UUIDs; these
//! handlers are plain lookup/insert glue with no booking invariants.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Movie, Review, Theater};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/movies",
            get(list_movies).post(create_movie),
        )
        .route(
            "/movies/{movie_id}",
            get(get_movie).delete(delete_movie),
        )
        .route(
            "/movies/{movie_id}/reviews",
            get(list_reviews).post(create_review),
        )
        .route("/theaters", get(list_theaters).post(create_theater))
        .route(
            "/user-profiles/{user_id}",
            get(get_user_profile).put(upsert_user_profile),
        )
}

/* ---------- MOVIES ---------- */

#[derive(Debug, sqlx::FromRow, Serialize)]
struct MovieListItem {
    movie_id: Uuid,
    title: String,
}

// GET /api/movies
async fn list_movies(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let rows = sqlx::query_as::<_, MovieListItem>(
        "SELECT movie_id, title FROM movies ORDER BY title",
    )
    .fetch_all(&state.db.pool)
    .await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
struct CreateMovieRequest {
    title: String,
    #[serde(flatten)]
    doc: Map<String, Value>,
}

// POST /api/movies
async fn create_movie(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateMovieRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.title.is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }

    let mut doc = req.doc;
    doc.entry("stats".to_string())
        .or_insert_with(|| json!({ "average_rating": 0.0, "total_reviews": 0 }));
    doc.entry("status".to_string())
        .or_insert_with(|| json!("now_showing"));

    let movie = sqlx::query_as::<_, Movie>(
        "INSERT INTO movies (title, doc)
         VALUES ($1, $2)
         RETURNING movie_id, title, doc, updated_at",
    )
    .bind(&req.title)
    .bind(Value::Object(doc))
    .fetch_one(&state.db.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(movie)))
}

// GET /api/movies/{movie_id}
async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let movie = sqlx::query_as::<_, Movie>(
        "SELECT movie_id, title, doc, updated_at FROM movies WHERE movie_id = $1",
    )
    .bind(movie_id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or_else(|| ApiError::not_found("movie not found"))?;

    Ok(Json(movie))
}

// DELETE /api/movies/{movie_id}
//
// Deletion is blocked while showtimes still reference the movie; the foreign
// key surfaces as a 409.
async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let result = sqlx::query("DELETE FROM movies WHERE movie_id = $1")
        .bind(movie_id)
        .execute(&state.db.pool)
        .await;

    match result {
        Ok(done) if done.rows_affected() > 0 => {
            Ok(Json(json!({ "message": "Movie deleted" })))
        }
        Ok(_) => Err(ApiError::not_found("movie not found")),
        Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => Err(
            ApiError::conflict("movie still has showtimes and cannot be deleted"),
        ),
        Err(e) => Err(e.into()),
    }
}

/* ---------- THEATERS ---------- */

// GET /api/theaters
async fn list_theaters(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let rows = sqlx::query_as::<_, Theater>(
        "SELECT theater_id, branch_name, doc, updated_at FROM theaters ORDER BY branch_name",
    )
    .fetch_all(&state.db.pool)
    .await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
struct CreateTheaterRequest {
    branch_name: String,
    #[serde(flatten)]
    doc: Map<String, Value>,
}

// POST /api/theaters
async fn create_theater(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTheaterRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.branch_name.is_empty() {
        return Err(ApiError::bad_request("branch_name is required"));
    }

    let theater = sqlx::query_as::<_, Theater>(
        "INSERT INTO theaters (branch_name, doc)
         VALUES ($1, $2)
         RETURNING theater_id, branch_name, doc, updated_at",
    )
    .bind(&req.branch_name)
    .bind(Value::Object(req.doc))
    .fetch_one(&state.db.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(theater)))
}

/* ---------- USER PROFILES ---------- */

#[derive(Debug, sqlx::FromRow, Serialize)]
struct UserProfile {
    user_id: i64,
    doc: Value,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

// GET /api/user-profiles/{user_id}
async fn get_user_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let profile = sqlx::query_as::<_, UserProfile>(
        "SELECT user_id, doc, created_at, updated_at FROM user_profiles WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or_else(|| ApiError::not_found("profile not found"))?;

    Ok(Json(profile))
}

// PUT /api/user-profiles/{user_id}
//
// Upsert with merge semantics: fields present in the body overwrite the
// stored doc, everything else is kept.
async fn upsert_user_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    if !body.is_object() {
        return Err(ApiError::bad_request("profile body must be a JSON object"));
    }

    let user_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)")
            .bind(user_id)
            .fetch_one(&state.db.pool)
            .await?;
    if !user_exists {
        return Err(ApiError::not_found("user not found"));
    }

    let profile = sqlx::query_as::<_, UserProfile>(
        "INSERT INTO user_profiles (user_id, doc)
         VALUES ($1, $2)
         ON CONFLICT (user_id)
         DO UPDATE SET doc = user_profiles.doc || EXCLUDED.doc, updated_at = now()
         RETURNING user_id, doc, created_at, updated_at",
    )
    .bind(user_id)
    .bind(&body)
    .fetch_one(&state.db.pool)
    .await?;

    Ok(Json(profile))
}

/* ---------- REVIEWS ---------- */

// GET /api/movies/{movie_id}/reviews
async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let rows = sqlx::query_as::<_, Review>(
        "SELECT review_id, movie_id, user_id, rating, comment,
                contains_spoilers, likes_count, created_at
         FROM reviews
         WHERE movie_id = $1
         ORDER BY created_at DESC",
    )
    .bind(movie_id)
    .fetch_all(&state.db.pool)
    .await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
struct CreateReviewRequest {
    user_id: i64,
    rating: i16,
    comment: String,
    #[serde(default)]
    contains_spoilers: bool,
}

// POST /api/movies/{movie_id}/reviews
async fn create_review(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<Uuid>,
    Json(req): Json<CreateReviewRequest>,
) -> ApiResult<impl IntoResponse> {
    if !(1..=5).contains(&req.rating) {
        return Err(ApiError::bad_request("rating must be between 1 and 5"));
    }
    if req.comment.is_empty() {
        return Err(ApiError::bad_request("comment is required"));
    }

    let movie_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM movies WHERE movie_id = $1)")
            .bind(movie_id)
            .fetch_one(&state.db.pool)
            .await?;
    if !movie_exists {
        return Err(ApiError::not_found("movie not found"));
    }

    let review = sqlx::query_as::<_, Review>(
        "INSERT INTO reviews (movie_id, user_id, rating, comment, contains_spoilers)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING review_id, movie_id, user_id, rating, comment,
                   contains_spoilers, likes_count, created_at",
    )
    .bind(movie_id)
    .bind(req.user_id)
    .bind(req.rating)
    .bind(&req.comment)
    .bind(req.contains_spoilers)
    .fetch_one(&state.db.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(review)))
}
