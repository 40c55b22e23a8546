//! User (borrower account) model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// User model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Signed; late fees can push it below zero
    #[schema(value_type = f64)]
    pub balance: Decimal,
}

/// Set balance request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBalance {
    #[schema(value_type = f64)]
    pub balance: Decimal,
}
