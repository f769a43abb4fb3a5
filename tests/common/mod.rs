// Not every test binary uses every helper.
#![allow(dead_code)]

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Seeded catalog for booking tests: one user, one movie with one showtime,
/// two seats.
pub struct Fixture {
    pub user_id: i64,
    pub movie_id: Uuid,
    pub showtime_id: i64,
    /// 100.00
    pub seat_a: i64,
    /// 150.00
    pub seat_b: i64,
}

pub fn dec(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

pub async fn seed(pool: &PgPool) -> Fixture {
    let user_id: i64 = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash, balance)
         VALUES ('moviegoer@example.com', 'x', $1)
         RETURNING user_id",
    )
    .bind(dec(50_000))
    .fetch_one(pool)
    .await
    .expect("seed user");

    let movie_id: Uuid = sqlx::query_scalar(
        "INSERT INTO movies (title, doc)
         VALUES ('Dune', '{\"status\": \"now_showing\"}')
         RETURNING movie_id",
    )
    .fetch_one(pool)
    .await
    .expect("seed movie");

    let showtime_id: i64 = sqlx::query_scalar(
        "INSERT INTO showtimes (movie_id, showtime)
         VALUES ($1, now() + interval '1 day')
         RETURNING showtime_id",
    )
    .bind(movie_id)
    .fetch_one(pool)
    .await
    .expect("seed showtime");

    let seat_a: i64 = sqlx::query_scalar(
        "INSERT INTO seats (seat, price) VALUES ('A1', $1) RETURNING seat_id",
    )
    .bind(dec(10_000))
    .fetch_one(pool)
    .await
    .expect("seed seat A1");

    let seat_b: i64 = sqlx::query_scalar(
        "INSERT INTO seats (seat, price) VALUES ('A2', $1) RETURNING seat_id",
    )
    .bind(dec(15_000))
    .fetch_one(pool)
    .await
    .expect("seed seat A2");

    Fixture {
        user_id,
        movie_id,
        showtime_id,
        seat_a,
        seat_b,
    }
}

pub async fn balance_of(pool: &PgPool, user_id: i64) -> Decimal {
    sqlx::query_scalar("SELECT balance FROM users WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("balance")
}

pub async fn set_balance(pool: &PgPool, user_id: i64, balance: Decimal) {
    sqlx::query("UPDATE users SET balance = $1 WHERE user_id = $2")
        .bind(balance)
        .bind(user_id)
        .execute(pool)
        .await
        .expect("set balance");
}

pub async fn hold_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM book_seat")
        .fetch_one(pool)
        .await
        .expect("hold count")
}

/// Payment.status = 'Paid' must coincide with SeatHold.status = 'booked' for
/// every booking that still exists.
pub async fn assert_money_seat_invariant(pool: &PgPool) {
    let divergent: i64 = sqlx::query_scalar(
        "SELECT COUNT(*)
         FROM payments p
         JOIN book_seat bs ON bs.book_id = p.book_id
         WHERE (p.status = 'Paid') <> (bs.status = 'booked')",
    )
    .fetch_one(pool)
    .await
    .expect("invariant query");
    assert_eq!(divergent, 0, "payment status diverged from seat status");

    // No leg of the triad may outlive the others.
    let orphans: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM booking b
         WHERE NOT EXISTS (SELECT 1 FROM book_seat bs WHERE bs.book_id = b.book_id)
            OR NOT EXISTS (SELECT 1 FROM payments p WHERE p.book_id = b.book_id)",
    )
    .fetch_one(pool)
    .await
    .expect("orphan query");
    assert_eq!(orphans, 0, "booking row without hold or payment");
}
