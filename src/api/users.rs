//! User account endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    models::user::{UpdateBalance, User},
};

/// Register a user with an initial balance
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = User,
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Invalid input or user already exists", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    Json(user): Json<User>,
) -> AppResult<StatusCode> {
    user.validate()?;

    state.services.users.create_user(user).await?;
    Ok(StatusCode::CREATED)
}

/// Set a user's balance
#[utoipa::path(
    patch,
    path = "/users/{email}/balance",
    tag = "users",
    params(
        ("email" = String, Path, description = "User email")
    ),
    request_body = UpdateBalance,
    responses(
        (status = 204, description = "Balance updated"),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn update_balance(
    State(state): State<crate::AppState>,
    Path(email): Path<String>,
    Json(request): Json<UpdateBalance>,
) -> AppResult<StatusCode> {
    let updated = state
        .services
        .users
        .update_balance(&email, request.balance)
        .await?;
    if !updated {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
