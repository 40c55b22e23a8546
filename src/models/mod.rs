//! Data models for Shelfkeeper

pub mod book;
pub mod reservation;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookQuery, CreateBook};
pub use reservation::{CreateReservation, Reservation, ReservationQuery};
pub use user::{UpdateBalance, User};
