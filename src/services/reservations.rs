//! Reservation lifecycle service
//!
//! Checkout and return of books, plus the daily batch jobs: due-soon and overdue
//! reminders, and late fees that can turn an overdue reservation into a forced purchase.
//!
//! Batch jobs process due reservations in chunks of [`BATCH_CHUNK_SIZE`]: every
//! reservation of a chunk runs concurrently, chunks run one after another. A failure on
//! one reservation is logged and never stops its siblings; the next daily run picks it
//! up again.

use std::{future::Future, sync::Arc};

use chrono::{DateTime, Duration, Local, NaiveDate, SecondsFormat, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{calendar, email::EmailSender};
use crate::{
    error::{AppError, AppResult},
    models::reservation::Reservation,
    repository::Repository,
};

/// Charged to the user for every reservation (3.00)
pub const RESERVATION_COST: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// Charged per overdue reservation per daily run (0.20)
pub const LATE_FEE: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

/// Reservations processed concurrently by a batch job
pub const BATCH_CHUNK_SIZE: usize = 10;

/// Days ahead of the due date the return reminder goes out
const DUE_SOON_DAYS: i64 = 2;

/// How far back overdue reminders look
const LATE_LOOKBACK_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reminder {
    Upcoming,
    Late,
}

impl Reminder {
    fn subject(self) -> &'static str {
        match self {
            Reminder::Upcoming => "Return Reminder",
            Reminder::Late => "Late Return Reminder",
        }
    }

    fn body(self, title: &str, due: DateTime<Utc>) -> String {
        let due = due.to_rfc3339_opts(SecondsFormat::Millis, true);
        match self {
            Reminder::Upcoming => format!(
                "Dear reader,\n\nThe book \"{}\" is due on {}.\n\
                 Please return it on time to avoid late fees.",
                title, due
            ),
            Reminder::Late => format!(
                "Dear reader,\n\nThe book \"{}\" was due on {}.\n\
                 Please return it as soon as possible, a late fee is charged every day.",
                title, due
            ),
        }
    }
}

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
    email: Arc<dyn EmailSender>,
}

impl ReservationsService {
    pub fn new(repository: Repository, email: Arc<dyn EmailSender>) -> Self {
        Self { repository, email }
    }

    /// Reserve copies of a book: checks stock and balance, stores the reservation
    /// together with the stock decrement, then charges the reservation cost.
    pub async fn create_reservation(&self, reservation: Reservation) -> AppResult<()> {
        let book = self
            .repository
            .books
            .find_by_id(&reservation.book_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Book with ID {} not found.", reservation.book_id))
            })?;

        if book.stock - reservation.book_count < 0 {
            return Err(AppError::OutOfStock(format!(
                "Book with ID {} out of stock.",
                reservation.book_id
            )));
        }

        if !self.repository.users.exists(&reservation.user_email).await? {
            return Err(AppError::NotFound(format!(
                "User with email {} not found.",
                reservation.user_email
            )));
        }

        let balance = self
            .repository
            .users
            .get_balance(&reservation.user_email)
            .await?
            .filter(|balance| *balance >= RESERVATION_COST)
            .ok_or_else(|| {
                AppError::InsufficientBalance(format!(
                    "User with email {} has insufficient balance.",
                    reservation.user_email
                ))
            })?;

        if !self.repository.reservations.save(&reservation).await? {
            return Err(AppError::NotFound(format!(
                "Book with ID {} not found.",
                reservation.book_id
            )));
        }

        // Not part of the reservation transaction: a failure here leaves the
        // reservation stored without the cost collected.
        let new_balance = balance - RESERVATION_COST;
        if !self
            .repository
            .users
            .update_balance(&reservation.user_email, new_balance)
            .await?
        {
            tracing::warn!(
                "User {} disappeared before the reservation cost was charged",
                reservation.user_email
            );
        }

        tracing::info!(
            "Book {} x{} reserved by {} until {}",
            reservation.book_id,
            reservation.book_count,
            reservation.user_email,
            reservation.return_date
        );
        Ok(())
    }

    /// Page through every reservation of a book (`page` is 1-based)
    pub async fn get_reservations_by_book_id(
        &self,
        book_id: &str,
        page: i64,
        limit: i64,
    ) -> AppResult<(Vec<Reservation>, i64)> {
        let offset = super::page_offset(page, limit)?;
        self.repository
            .reservations
            .find_by_book_id(book_id, offset, limit)
            .await
    }

    /// Return a reservation's copies to stock.
    ///
    /// Returns `Ok(false)` when no reservation has this id.
    pub async fn finish_reservation(&self, id: Uuid) -> AppResult<bool> {
        let Some(reservation) = self.repository.reservations.find_by_id(id).await? else {
            return Ok(false);
        };

        if !reservation.is_active() {
            let message = if reservation.is_returned {
                format!("Reservation with ID {} is already finished.", id)
            } else {
                format!("Reservation with ID {} was converted into a purchase.", id)
            };
            return Err(AppError::AlreadyFinished(message));
        }

        self.repository
            .reservations
            .finish_reservation(&reservation, Utc::now())
            .await?;
        Ok(true)
    }

    /// Remind users whose reservations are due two days from today
    pub async fn notify_upcoming_due_date(&self) -> AppResult<()> {
        self.notify_upcoming_due_date_at(Local::now()).await
    }

    pub async fn notify_upcoming_due_date_at(&self, now: DateTime<Local>) -> AppResult<()> {
        let target = now.date_naive() + Duration::days(DUE_SOON_DAYS);
        let due = self
            .repository
            .reservations
            .find_due_reservations(
                Some(calendar::start_of_day(target)),
                Some(calendar::end_of_day(target)),
            )
            .await?;

        tracing::info!("{} reservation(s) due on {}", due.len(), target);
        process_in_chunks(&due, "Return reminder", |reservation| {
            self.send_reminder(reservation, Reminder::Upcoming)
        })
        .await;
        Ok(())
    }

    /// Remind users whose reservations fell due during the last three days
    pub async fn notify_late_returns(&self) -> AppResult<()> {
        self.notify_late_returns_at(Local::now()).await
    }

    pub async fn notify_late_returns_at(&self, now: DateTime<Local>) -> AppResult<()> {
        let today = now.date_naive();
        let due = self
            .repository
            .reservations
            .find_due_reservations(
                Some(calendar::start_of_day(today - Duration::days(LATE_LOOKBACK_DAYS))),
                Some(calendar::end_of_day(today)),
            )
            .await?;

        tracing::info!("{} late reservation(s) to remind", due.len());
        process_in_chunks(&due, "Late return reminder", |reservation| {
            self.send_reminder(reservation, Reminder::Late)
        })
        .await;
        Ok(())
    }

    /// Charge the daily late fee on every reservation due today or earlier
    pub async fn apply_late_return_charge(&self) -> AppResult<()> {
        self.apply_late_return_charge_at(Local::now()).await
    }

    pub async fn apply_late_return_charge_at(&self, now: DateTime<Local>) -> AppResult<()> {
        let today = now.date_naive();
        let end = calendar::start_of_day(today + Duration::days(1));
        let due = self
            .repository
            .reservations
            .find_due_reservations(None, Some(end))
            .await?;

        tracing::info!("Charging late fee on {} reservation(s)", due.len());
        process_in_chunks(&due, "Late fee", |reservation| {
            self.charge_late_fee(reservation, today)
        })
        .await;
        Ok(())
    }

    async fn send_reminder(&self, reservation: &Reservation, reminder: Reminder) -> AppResult<()> {
        let Some(book) = self.repository.books.find_by_id(&reservation.book_id).await? else {
            tracing::warn!(
                book_id = %reservation.book_id,
                "Book not found, no reminder sent to {}",
                reservation.user_email
            );
            return Ok(());
        };

        self.email
            .send_email(
                &reservation.user_email,
                reminder.subject(),
                &reminder.body(&book.title, reservation.return_date),
            )
            .await
    }

    async fn charge_late_fee(&self, reservation: &Reservation, today: NaiveDate) -> AppResult<()> {
        let charged = self
            .repository
            .users
            .increment_balance(&reservation.user_email, -LATE_FEE)
            .await?;
        if !charged {
            tracing::warn!(
                book_id = %reservation.book_id,
                "No user {} to charge the late fee",
                reservation.user_email
            );
            return Ok(());
        }

        let Some(book) = self.repository.books.find_by_id(&reservation.book_id).await? else {
            return Ok(());
        };

        let count = Decimal::from(reservation.book_count);
        let days_late = calendar::days_late(reservation.return_date, today);
        let total_late_fee = Decimal::from(days_late) * LATE_FEE * count;
        let book_price = book.price * count;

        if total_late_fee >= book_price {
            if let Some(id) = reservation.id {
                self.repository.reservations.buy_reservation(id).await?;
                tracing::info!(
                    book_id = %reservation.book_id,
                    "Reservation {} bought by {}: late fees {} reached price {}",
                    id,
                    reservation.user_email,
                    total_late_fee,
                    book_price
                );
            }
        }
        Ok(())
    }
}

async fn process_in_chunks<'a, F, Fut>(reservations: &'a [Reservation], job: &str, task: F)
where
    F: Fn(&'a Reservation) -> Fut,
    Fut: Future<Output = AppResult<()>>,
{
    for chunk in reservations.chunks(BATCH_CHUNK_SIZE) {
        let results = join_all(chunk.iter().map(&task)).await;
        for (reservation, result) in chunk.iter().zip(results) {
            if let Err(e) = result {
                tracing::error!(
                    book_id = %reservation.book_id,
                    "{} failed for reservation {:?}: {}",
                    job,
                    reservation.id,
                    e
                );
            }
        }
    }
}
