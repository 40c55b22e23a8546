//! Books repository (stock ledger)

use async_trait::async_trait;
use sqlx::{PgExecutor, Pool, Postgres};

use crate::{error::AppResult, models::book::Book};

/// Book persistence contract
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn find_by_id(&self, book_id: &str) -> AppResult<Option<Book>>;

    /// Exact-match filters; returns the page and the total number of matches
    async fn find_by_filters(
        &self,
        skip: i64,
        limit: i64,
        title: Option<String>,
        author: Option<String>,
        publication_year: Option<i32>,
    ) -> AppResult<(Vec<Book>, i64)>;

    async fn save(&self, book: &Book) -> AppResult<()>;

    /// Returns false when no book was deleted
    async fn delete(&self, book_id: &str) -> AppResult<bool>;

    async fn exists(&self, book_id: &str) -> AppResult<bool>;

    /// Adds `delta` to the stock and returns the updated book, if any
    async fn increment_stock(&self, book_id: &str, delta: i32) -> AppResult<Option<Book>>;
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Stock update usable on the pool or inside a reservation transaction
pub(crate) async fn increment_stock_with<'e, E>(
    executor: E,
    book_id: &str,
    delta: i32,
) -> AppResult<Option<Book>>
where
    E: PgExecutor<'e>,
{
    let book = sqlx::query_as::<_, Book>(
        "UPDATE books SET stock = stock + $1 WHERE book_id = $2 RETURNING *",
    )
    .bind(delta)
    .bind(book_id)
    .fetch_optional(executor)
    .await?;
    Ok(book)
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn find_by_id(&self, book_id: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE book_id = $1")
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn find_by_filters(
        &self,
        skip: i64,
        limit: i64,
        title: Option<String>,
        author: Option<String>,
        publication_year: Option<i32>,
    ) -> AppResult<(Vec<Book>, i64)> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if title.is_some() {
            conditions.push(format!("title = ${}", idx));
            idx += 1;
        }
        if author.is_some() {
            conditions.push(format!("author = ${}", idx));
            idx += 1;
        }
        if publication_year.is_some() {
            conditions.push(format!("publication_year = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_q = format!("SELECT COUNT(*) FROM books {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        if let Some(ref t) = title { count_builder = count_builder.bind(t); }
        if let Some(ref a) = author { count_builder = count_builder.bind(a); }
        if let Some(y) = publication_year { count_builder = count_builder.bind(y); }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_q = format!(
            "SELECT * FROM books {} ORDER BY book_id LIMIT {} OFFSET {}",
            where_clause, limit, skip
        );
        let mut builder = sqlx::query_as::<_, Book>(&select_q);
        if let Some(ref t) = title { builder = builder.bind(t); }
        if let Some(ref a) = author { builder = builder.bind(a); }
        if let Some(y) = publication_year { builder = builder.bind(y); }

        let books = builder.fetch_all(&self.pool).await?;
        Ok((books, total))
    }

    async fn save(&self, book: &Book) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO books (book_id, title, author, publication_year, publisher, price, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&book.book_id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.publication_year)
        .bind(&book.publisher)
        .bind(book.price)
        .bind(book.stock)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Book {} saved", book.book_id);
        Ok(())
    }

    async fn delete(&self, book_id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, book_id: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE book_id = $1)")
                .bind(book_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn increment_stock(&self, book_id: &str, delta: i32) -> AppResult<Option<Book>> {
        increment_stock_with(&self.pool, book_id, delta).await
    }
}
