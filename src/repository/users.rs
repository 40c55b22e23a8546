//! Users repository (balance ledger)

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::user::User};

/// User persistence contract
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn exists(&self, email: &str) -> AppResult<bool>;

    async fn get_balance(&self, email: &str) -> AppResult<Option<Decimal>>;

    /// Overwrites the balance; false when no user matched
    async fn update_balance(&self, email: &str, new_balance: Decimal) -> AppResult<bool>;

    /// Atomically adds `delta`; false when no user matched
    async fn increment_balance(&self, email: &str, delta: Decimal) -> AppResult<bool>;

    async fn save(&self, user: &User) -> AppResult<()>;
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UsersRepository {
    async fn exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn get_balance(&self, email: &str) -> AppResult<Option<Decimal>> {
        let balance = sqlx::query_scalar::<_, Decimal>("SELECT balance FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(balance)
    }

    async fn update_balance(&self, email: &str, new_balance: Decimal) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET balance = $1 WHERE email = $2")
            .bind(new_balance)
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn increment_balance(&self, email: &str, delta: Decimal) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET balance = balance + $1 WHERE email = $2")
            .bind(delta)
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        sqlx::query("INSERT INTO users (email, balance) VALUES ($1, $2)")
            .bind(&user.email)
            .bind(user.balance)
            .execute(&self.pool)
            .await?;

        tracing::debug!("User {} saved", user.email);
        Ok(())
    }
}
