//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    models::book::{Book, BookQuery, CreateBook},
};

/// Book search result page
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookSearchResponse {
    pub books: Vec<Book>,
    /// Books matching the filters across all pages
    pub total_records: i64,
}

/// Get a book by its ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state
        .services
        .books
        .get_book(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;
    Ok(Json(book))
}

/// Search books by title, author and publication year
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Matching books", body = BookSearchResponse),
        (status = 400, description = "Invalid pagination", body = ErrorResponse),
        (status = 404, description = "No books found", body = ErrorResponse)
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<BookSearchResponse>> {
    if query.page() < 1 || query.limit() < 1 {
        return Err(AppError::Validation("page and limit must be at least 1".to_string()));
    }

    let (books, total_records) = state.services.books.search_books(&query).await?;
    if books.is_empty() {
        return Err(AppError::NotFound("No books found".to_string()));
    }

    Ok(Json(BookSearchResponse { books, total_records }))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created"),
        (status = 400, description = "Invalid input or book already exists", body = ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBook>,
) -> AppResult<StatusCode> {
    request.validate()?;

    state.services.books.create_book(request.into()).await?;
    Ok(StatusCode::CREATED)
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted"),
        (status = 400, description = "Book has active reservations", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.books.delete_book(&id).await?;
    Ok(StatusCode::OK)
}
