//! booking.rs
//!
//! The booking engine: the create -> confirm/cancel -> refund lifecycle for
//! seat holds, run as short transactions against Postgres.
//!
//! Every operation locks the rows it reads-then-writes (`SELECT ... FOR
//! UPDATE`) inside a single transaction, so:
//! - two holds racing for one (showtime, seat) resolve to exactly one winner,
//! - balance debits for one user serialize on the user row,
//! - cancel/refund cannot interleave with a confirmation of the same booking
//!   (the payment row is the serialization point).
//!
//! A `book_seat` row existing at all is what makes a seat taken; deleting the
//! row frees the seat. Payment status and seat-hold status only ever change
//! together: 'Pending'/'pending' at creation, 'Paid'/'booked' at
//! confirmation, gone at cancellation or refund.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::error::BookingError;
use crate::services::catalog;

/// One created hold out of a bulk request.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedHold {
    pub book_id: i64,
    pub seat_id: i64,
    pub amount: Decimal,
}

/// What a refund actually did.
#[derive(Debug, Clone, PartialEq)]
pub enum RefundOutcome {
    /// Payment was Paid: balance credited, rows deleted.
    Refunded { amount: Decimal },
    /// Payment was still Pending: cancelled, nothing to credit.
    PendingCancelled,
}

/// One row of a user's payment history.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransactionRow {
    pub payment_id: i64,
    pub book_id: i64,
    pub amount: Decimal,
    pub payment_time: DateTime<Utc>,
    pub status: String,
    pub showtime: DateTime<Utc>,
    pub seat: String,
    pub movie: String,
}

/// One row of the admin booking overview.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminBookingRow {
    pub payment_id: i64,
    pub book_id: i64,
    pub amount: Decimal,
    pub payment_time: DateTime<Utc>,
    pub status: String,
    pub user_email: String,
    pub movie: String,
    pub seat: String,
}

#[derive(Clone)]
pub struct BookingEngine {
    pool: PgPool,
}

impl BookingEngine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hold every seat in `seat_ids` for `showtime_id`, as one atomic unit.
    ///
    /// Each seat gets its own booking + seat-hold + Pending payment, but the
    /// batch either fully succeeds or leaves nothing behind. Balance is not
    /// checked here; funds are only validated at confirmation.
    pub async fn create_hold(
        &self,
        user_id: i64,
        showtime_id: i64,
        seat_ids: &[i64],
    ) -> Result<Vec<CreatedHold>, BookingError> {
        if seat_ids.is_empty() {
            return Err(BookingError::Validation(
                "seat_ids must not be empty".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        // Shared lock keeps the user row alive until commit; without it an
        // unknown user would only surface later as an FK violation.
        let user: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM users WHERE user_id = $1 FOR SHARE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if user.is_none() {
            return Err(BookingError::UserNotFound(user_id));
        }

        if !catalog::showtime_exists(&mut *tx, showtime_id).await? {
            return Err(BookingError::ShowtimeNotFound(showtime_id));
        }

        let mut created = Vec::with_capacity(seat_ids.len());
        for &seat_id in seat_ids {
            let price = catalog::seat_price(&mut *tx, seat_id)
                .await?
                .ok_or(BookingError::SeatNotFound(seat_id))?;

            // Lock the hold row if one exists; any row, pending or booked,
            // means the seat is taken. Early return drops the transaction
            // and rolls back every seat already inserted in this batch.
            let held: Option<String> = sqlx::query_scalar(
                "SELECT status FROM book_seat
                 WHERE showtime_id = $1 AND seat_id = $2
                 FOR UPDATE",
            )
            .bind(showtime_id)
            .bind(seat_id)
            .fetch_optional(&mut *tx)
            .await?;

            if held.is_some() {
                return Err(BookingError::SeatUnavailable(seat_id));
            }

            let book_id: i64 = sqlx::query_scalar(
                "INSERT INTO booking (user_id, showtime_id)
                 VALUES ($1, $2)
                 RETURNING book_id",
            )
            .bind(user_id)
            .bind(showtime_id)
            .fetch_one(&mut *tx)
            .await?;

            // The probe above found no row, but a concurrent transaction may
            // commit one before our insert. The (showtime_id, seat_id)
            // primary key settles that race: whoever inserts second affects
            // zero rows and loses.
            let inserted = sqlx::query(
                "INSERT INTO book_seat (book_id, showtime_id, seat_id, status)
                 VALUES ($1, $2, $3, 'pending')
                 ON CONFLICT (showtime_id, seat_id) DO NOTHING",
            )
            .bind(book_id)
            .bind(showtime_id)
            .bind(seat_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if inserted == 0 {
                return Err(BookingError::SeatUnavailable(seat_id));
            }

            sqlx::query(
                "INSERT INTO payments (book_id, amount, status)
                 VALUES ($1, $2, 'Pending')",
            )
            .bind(book_id)
            .bind(price)
            .execute(&mut *tx)
            .await?;

            created.push(CreatedHold {
                book_id,
                seat_id,
                amount: price,
            });
        }

        tx.commit().await?;
        tracing::info!(
            user_id,
            showtime_id,
            seats = created.len(),
            "holds created"
        );
        Ok(created)
    }

    /// Confirm a single pending booking: debit the user's balance and flip
    /// payment and seat-hold to their paid state, atomically.
    pub async fn confirm_one(&self, book_id: i64) -> Result<(), BookingError> {
        let mut tx = self.pool.begin().await?;

        let payment: Option<(Decimal, String, i64)> = sqlx::query_as(
            "SELECT p.amount, p.status, b.user_id
             FROM payments p
             JOIN booking b ON b.book_id = p.book_id
             WHERE p.book_id = $1
             FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (amount, status, user_id) =
            payment.ok_or(BookingError::BookingNotFound(book_id))?;
        if status != "Pending" {
            return Err(BookingError::NoPendingPayment);
        }

        Self::debit_user(&mut tx, user_id, amount).await?;
        Self::mark_paid(&mut tx, &[book_id]).await?;

        tx.commit().await?;
        tracing::info!(book_id, user_id, %amount, "booking confirmed");
        Ok(())
    }

    /// Confirm every pending booking of a user in one transaction. The debit
    /// is all-or-nothing across the whole pending set, never per seat.
    pub async fn confirm_all(&self, user_id: i64) -> Result<usize, BookingError> {
        let mut tx = self.pool.begin().await?;

        let pending: Vec<(i64, Decimal)> = sqlx::query_as(
            "SELECT b.book_id, p.amount
             FROM booking b
             JOIN payments p ON p.book_id = b.book_id
             WHERE b.user_id = $1 AND p.status = 'Pending'
             ORDER BY b.book_id
             FOR UPDATE",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        if pending.is_empty() {
            return Err(BookingError::NoPendingPayment);
        }

        let total: Decimal = pending.iter().map(|(_, amount)| *amount).sum();
        Self::debit_user(&mut tx, user_id, total).await?;

        let book_ids: Vec<i64> = pending.iter().map(|(id, _)| *id).collect();
        Self::mark_paid(&mut tx, &book_ids).await?;

        tx.commit().await?;
        tracing::info!(user_id, count = book_ids.len(), %total, "all pending bookings confirmed");
        Ok(book_ids.len())
    }

    /// Release a still-pending hold. The seat is free again the moment the
    /// rows are gone.
    pub async fn cancel_hold(&self, book_id: i64) -> Result<(), BookingError> {
        let mut tx = self.pool.begin().await?;

        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM payments WHERE book_id = $1 FOR UPDATE")
                .bind(book_id)
                .fetch_optional(&mut *tx)
                .await?;

        match status.as_deref() {
            Some("Pending") => {}
            // Paid bookings must go through refund.
            _ => return Err(BookingError::CannotCancel),
        }

        Self::delete_booking_rows(&mut tx, book_id).await?;

        tx.commit().await?;
        tracing::info!(book_id, "hold cancelled");
        Ok(())
    }

    /// Administrative reversal of a booking. Paid bookings get the amount
    /// credited back; a still-pending booking falls back to a plain cancel.
    /// A booking that no longer exists fails `PaymentNotFound`, so a repeated
    /// refund can never credit twice.
    pub async fn refund(&self, book_id: i64) -> Result<RefundOutcome, BookingError> {
        let mut tx = self.pool.begin().await?;

        let payment: Option<(Decimal, String, i64)> = sqlx::query_as(
            "SELECT p.amount, p.status, b.user_id
             FROM payments p
             JOIN booking b ON b.book_id = p.book_id
             WHERE p.book_id = $1
             FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (amount, status, user_id) =
            payment.ok_or(BookingError::PaymentNotFound(book_id))?;

        let outcome = if status == "Paid" {
            sqlx::query("UPDATE users SET balance = balance + $1 WHERE user_id = $2")
                .bind(amount)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            RefundOutcome::Refunded { amount }
        } else {
            RefundOutcome::PendingCancelled
        };

        Self::delete_booking_rows(&mut tx, book_id).await?;

        tx.commit().await?;
        tracing::info!(book_id, user_id, ?outcome, "booking refunded");
        Ok(outcome)
    }

    /// Payment history for a user, with movie/showtime/seat labels, newest
    /// first.
    pub async fn transactions(&self, user_id: i64) -> Result<Vec<TransactionRow>, BookingError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT p.payment_id,
                    p.book_id,
                    p.amount,
                    p.payment_time,
                    p.status,
                    st.showtime,
                    s.seat,
                    m.title AS movie
             FROM payments p
             JOIN booking b ON p.book_id = b.book_id
             JOIN showtimes st ON b.showtime_id = st.showtime_id
             JOIN movies m ON st.movie_id = m.movie_id
             JOIN book_seat bs ON b.book_id = bs.book_id
             JOIN seats s ON bs.seat_id = s.seat_id
             WHERE b.user_id = $1
             ORDER BY p.payment_time DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Every booking in the system, for the admin overview.
    pub async fn all_bookings(&self) -> Result<Vec<AdminBookingRow>, BookingError> {
        let rows = sqlx::query_as::<_, AdminBookingRow>(
            "SELECT p.payment_id,
                    p.book_id,
                    p.amount,
                    p.payment_time,
                    p.status,
                    u.email AS user_email,
                    m.title AS movie,
                    s.seat
             FROM payments p
             JOIN booking b ON p.book_id = b.book_id
             JOIN users u ON b.user_id = u.user_id
             JOIN showtimes st ON b.showtime_id = st.showtime_id
             JOIN movies m ON st.movie_id = m.movie_id
             JOIN book_seat bs ON b.book_id = bs.book_id
             JOIN seats s ON bs.seat_id = s.seat_id
             ORDER BY p.payment_time DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Lock the user row and debit `amount`, failing without any write if the
    /// balance does not cover it.
    async fn debit_user(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        amount: Decimal,
    ) -> Result<(), BookingError> {
        let balance: Option<Decimal> =
            sqlx::query_scalar("SELECT balance FROM users WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await?;

        match balance {
            Some(balance) if balance >= amount => {}
            _ => return Err(BookingError::InsufficientBalance),
        }

        sqlx::query("UPDATE users SET balance = balance - $1 WHERE user_id = $2")
            .bind(amount)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Flip payments and seat-holds of `book_ids` to Paid/booked in lockstep.
    async fn mark_paid(
        tx: &mut Transaction<'_, Postgres>,
        book_ids: &[i64],
    ) -> Result<(), BookingError> {
        sqlx::query("UPDATE payments SET status = 'Paid' WHERE book_id = ANY($1)")
            .bind(book_ids)
            .execute(&mut **tx)
            .await?;
        sqlx::query("UPDATE book_seat SET status = 'booked' WHERE book_id = ANY($1)")
            .bind(book_ids)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Delete the seat-hold, payment and booking rows of one booking. Order
    /// matters only for the foreign keys.
    async fn delete_booking_rows(
        tx: &mut Transaction<'_, Postgres>,
        book_id: i64,
    ) -> Result<(), BookingError> {
        sqlx::query("DELETE FROM book_seat WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut **tx)
            .await?;
        sqlx::query("DELETE FROM payments WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut **tx)
            .await?;
        sqlx::query("DELETE FROM booking WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
