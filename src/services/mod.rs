//! Business logic services

pub mod books;
pub mod calendar;
pub mod email;
pub mod reservations;
pub mod scheduler;
pub mod users;

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub users: users::UsersService,
    pub reservations: reservations::ReservationsService,
}

impl Services {
    /// Create all services over the given repository and mail sender
    pub fn new(repository: Repository, email: Arc<dyn email::EmailSender>) -> Self {
        Self {
            books: books::BooksService::new(repository.clone()),
            users: users::UsersService::new(repository.clone()),
            reservations: reservations::ReservationsService::new(repository, email),
        }
    }
}

/// Row offset of a 1-based page; rejects pages whose offset does not fit an `i64`
pub(crate) fn page_offset(page: i64, limit: i64) -> AppResult<i64> {
    if page < 1 || limit < 1 {
        return Err(AppError::Validation("page and limit must be at least 1".to_string()));
    }
    (page - 1)
        .checked_mul(limit)
        .ok_or_else(|| AppError::Validation("page is out of range".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 10).unwrap(), 0);
        assert_eq!(page_offset(3, 10).unwrap(), 20);
        assert!(matches!(page_offset(0, 10), Err(AppError::Validation(_))));
        assert!(matches!(page_offset(i64::MAX, 10), Err(AppError::Validation(_))));
        assert_eq!(page_offset(i64::MAX, 1).unwrap(), i64::MAX - 1);
    }
}
