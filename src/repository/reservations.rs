//! Reservations repository
//!
//! Creating and finishing a reservation both touch the books table as well; those two
//! writes run inside a single transaction, and any early return drops the transaction,
//! which rolls it back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::books::increment_stock_with;
use crate::{
    error::{AppError, AppResult},
    models::reservation::Reservation,
};

/// Reservation persistence contract
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>>;

    /// Inserts the reservation and takes `book_count` copies out of stock.
    /// Returns false, with nothing written, when the book does not exist.
    async fn save(&self, reservation: &Reservation) -> AppResult<bool>;

    /// Unreturned reservations of a book
    async fn find_active_by_book_id(&self, book_id: &str) -> AppResult<Vec<Reservation>>;

    async fn find_by_book_id(
        &self,
        book_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Reservation>, i64)>;

    /// Unreturned, unbought reservations due within the inclusive bounds
    async fn find_due_reservations(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Reservation>>;

    /// Marks the reservation returned and puts its copies back in stock
    async fn finish_reservation(
        &self,
        reservation: &Reservation,
        real_return_date: DateTime<Utc>,
    ) -> AppResult<()>;

    async fn buy_reservation(&self, id: Uuid) -> AppResult<()>;
}

/// Only an active reservation can be finished
const FINISH_RESERVATION: &str = r#"
    UPDATE reservations
    SET is_returned = TRUE, real_return_date = $1
    WHERE id = $2 AND is_returned = FALSE AND is_bought = FALSE
"#;

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationStore for ReservationsRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Reservation>> {
        let reservation =
            sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(reservation)
    }

    async fn save(&self, reservation: &Reservation) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let id = reservation.id.unwrap_or_else(Uuid::new_v4);
        sqlx::query(
            r#"
            INSERT INTO reservations (
                id, book_id, user_email, book_count, reservation_date,
                return_date, is_returned, real_return_date, is_bought
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(id)
        .bind(&reservation.book_id)
        .bind(&reservation.user_email)
        .bind(reservation.book_count)
        .bind(reservation.reservation_date)
        .bind(reservation.return_date)
        .bind(reservation.is_returned)
        .bind(reservation.real_return_date)
        .bind(reservation.is_bought)
        .execute(&mut *tx)
        .await?;

        let book = increment_stock_with(&mut *tx, &reservation.book_id, -reservation.book_count).await?;
        if book.is_none() {
            tx.rollback().await?;
            tracing::warn!("Book {} not found, reservation rolled back", reservation.book_id);
            return Ok(false);
        }

        tx.commit().await?;
        tracing::info!(
            "Reservation {} saved: {} x{} for {}",
            id, reservation.book_id, reservation.book_count, reservation.user_email
        );
        Ok(true)
    }

    async fn find_active_by_book_id(&self, book_id: &str) -> AppResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE book_id = $1 AND is_returned = FALSE",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reservations)
    }

    async fn find_by_book_id(
        &self,
        book_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Reservation>, i64)> {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE book_id = $1
            ORDER BY reservation_date
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(book_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((reservations, total))
    }

    async fn find_due_reservations(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Reservation>> {
        // NULL bounds are open
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE is_returned = FALSE
              AND is_bought = FALSE
              AND ($1::timestamptz IS NULL OR return_date >= $1)
              AND ($2::timestamptz IS NULL OR return_date <= $2)
            ORDER BY return_date
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(reservations)
    }

    async fn finish_reservation(
        &self,
        reservation: &Reservation,
        real_return_date: DateTime<Utc>,
    ) -> AppResult<()> {
        let id = reservation
            .id
            .ok_or_else(|| AppError::Internal("Cannot finish an unsaved reservation".to_string()))?;

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(FINISH_RESERVATION)
            .bind(real_return_date)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // Also covers a reservation bought by the late-fee job since it was read
        if updated.rows_affected() == 0 {
            return Err(AppError::AlreadyFinished(format!(
                "Reservation with ID {} is already finished.",
                id
            )));
        }

        increment_stock_with(&mut *tx, &reservation.book_id, reservation.book_count)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Book with ID {} not found.", reservation.book_id))
            })?;

        tx.commit().await?;
        tracing::info!("Reservation {} finished", id);
        Ok(())
    }

    async fn buy_reservation(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE reservations SET is_bought = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
