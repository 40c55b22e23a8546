//! Book (catalog entry with stock) model and related types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Stock given to a book created without an explicit count
pub const DEFAULT_STOCK: i32 = 4;

/// Book model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub publisher: String,
    /// Unit price, compared against accrued late fees
    #[schema(value_type = f64)]
    pub price: Decimal,
    /// Copies available for reservation (never negative)
    pub stock: i32,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, message = "bookId must not be empty"))]
    pub book_id: String,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
    pub publication_year: i32,
    #[serde(default)]
    pub publisher: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    /// Defaults to 4 copies
    #[validate(range(min = 0, message = "stock must not be negative"))]
    pub stock: Option<i32>,
}

impl From<CreateBook> for Book {
    fn from(book: CreateBook) -> Self {
        Self {
            book_id: book.book_id,
            title: book.title,
            author: book.author,
            publication_year: book.publication_year,
            publisher: book.publisher,
            price: book.price,
            stock: book.stock.unwrap_or(DEFAULT_STOCK),
        }
    }
}

/// Query parameters for book search
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Exact title
    pub title: Option<String>,
    /// Exact author
    pub author: Option<String>,
    pub publication_year: Option<i32>,
    /// Page number (1-based, default: 1)
    pub page: Option<i64>,
    /// Books per page (default: 10)
    pub limit: Option<i64>,
}

impl BookQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10)
    }
}
