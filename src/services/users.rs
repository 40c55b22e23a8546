//! User account service

use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::user::User,
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create_user(&self, user: User) -> AppResult<()> {
        if self.repository.users.exists(&user.email).await? {
            return Err(AppError::AlreadyExists(format!(
                "User with email {} already exists.",
                user.email
            )));
        }
        self.repository.users.save(&user).await
    }

    /// Overwrite a user's balance; false when the user does not exist
    pub async fn update_balance(&self, email: &str, new_balance: Decimal) -> AppResult<bool> {
        let updated = self.repository.users.update_balance(email, new_balance).await?;
        if updated {
            tracing::info!("Balance of {} set to {}", email, new_balance);
        }
        Ok(updated)
    }
}
