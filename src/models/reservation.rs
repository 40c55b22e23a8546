//! Reservation (checkout) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Reservation model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Assigned by the store on creation
    pub id: Option<Uuid>,
    pub book_id: String,
    pub user_email: String,
    pub book_count: i32,
    pub reservation_date: DateTime<Utc>,
    /// Due date
    pub return_date: DateTime<Utc>,
    pub is_returned: bool,
    pub real_return_date: Option<DateTime<Utc>>,
    /// Converted into a forced purchase by the late-fee job
    pub is_bought: bool,
}

impl Reservation {
    /// Build a fresh, unsaved reservation starting at `now`
    pub fn new(
        book_id: impl Into<String>,
        user_email: impl Into<String>,
        book_count: i32,
        return_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            book_id: book_id.into(),
            user_email: user_email.into(),
            book_count,
            reservation_date: now,
            return_date,
            is_returned: false,
            real_return_date: None,
            is_bought: false,
        }
    }

    /// Neither returned nor converted into a purchase
    pub fn is_active(&self) -> bool {
        !self.is_returned && !self.is_bought
    }
}

/// Create reservation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservation {
    #[validate(length(min = 1, message = "bookId must not be empty"))]
    pub book_id: String,
    #[validate(email(message = "Invalid email format"))]
    pub user_email: String,
    #[validate(range(min = 1, message = "bookCount must be at least 1"))]
    pub book_count: i32,
    /// Due date, must be in the future
    pub return_date: DateTime<Utc>,
}

/// Pagination for reservations of a book
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ReservationQuery {
    /// Page number (1-based, default: 1)
    pub page: Option<i64>,
    /// Reservations per page (default: 10)
    pub limit: Option<i64>,
}

impl ReservationQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10)
    }
}
