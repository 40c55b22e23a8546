//! Book catalog service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_book(&self, book_id: &str) -> AppResult<Option<Book>> {
        self.repository.books.find_by_id(book_id).await
    }

    /// Search books with exact-match filters and 1-based pagination
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let skip = super::page_offset(query.page(), query.limit())?;
        self.repository
            .books
            .find_by_filters(
                skip,
                query.limit(),
                query.title.clone(),
                query.author.clone(),
                query.publication_year,
            )
            .await
    }

    pub async fn create_book(&self, book: Book) -> AppResult<()> {
        if self.repository.books.exists(&book.book_id).await? {
            return Err(AppError::AlreadyExists(format!(
                "Book with ID {} already exists.",
                book.book_id
            )));
        }
        self.repository.books.save(&book).await
    }

    /// Delete a book that no unreturned reservation references
    pub async fn delete_book(&self, book_id: &str) -> AppResult<()> {
        let active = self
            .repository
            .reservations
            .find_active_by_book_id(book_id)
            .await?;
        if !active.is_empty() {
            return Err(AppError::HasActiveReservations(format!(
                "Book with ID {} has {} active reservation(s).",
                book_id,
                active.len()
            )));
        }

        if !self.repository.books.delete(book_id).await? {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        tracing::info!("Book {} deleted", book_id);
        Ok(())
    }
}
