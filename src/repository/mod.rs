//! Repository layer for database operations

pub mod books;
pub mod reservations;
pub mod users;

use sqlx::{Pool, Postgres};
use std::sync::Arc;

pub use books::BookStore;
pub use reservations::ReservationStore;
pub use users::UserStore;

/// Store handles shared by all services
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub users: Arc<dyn UserStore>,
    pub reservations: Arc<dyn ReservationStore>,
}

impl Repository {
    /// Create a Postgres-backed repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool.clone())),
            reservations: Arc::new(reservations::ReservationsRepository::new(pool)),
        }
    }

    /// Assemble a repository from arbitrary store implementations
    pub fn from_stores(
        books: Arc<dyn BookStore>,
        users: Arc<dyn UserStore>,
        reservations: Arc<dyn ReservationStore>,
    ) -> Self {
        Self {
            books,
            users,
            reservations,
        }
    }
}
